//! URL and header builder module
//!
//! Composition of outbound request URLs and headers from small declarative
//! pieces.
//!
//! - [`UrlBuilder`]: base URL + path segments + query parameters
//! - [`Headers`]: ordered header list with overwrite/append modes
//! - [`form_pairs`]: nested JSON to `application/x-www-form-urlencoded` pairs

mod builder;
mod form;
mod headers;

pub use builder::UrlBuilder;
pub use form::{encode_form, form_pairs};
pub use headers::{Header, HeaderMode, Headers};
