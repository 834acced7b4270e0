//! JSON query module
//!
//! Typed, path-based extraction over a parsed JSON tree.
//!
//! # Overview
//!
//! A [`Query`] is built from a root node and a list of zoom segments. Every
//! getter comes in two flavours:
//!
//! - `*_required` returns the value or an error (`KeyNotFound`, `NullJson`,
//!   `Not<Type>`)
//! - `*_optional` returns `Ok(None)` for a missing path or a JSON null, and
//!   still errors on a present value of the wrong type
//!
//! An empty key refers to the zoomed node itself.
//!
//! [`parse_result`] is the single read pipeline used by every provider.

mod convert;
mod parse;
mod query;

pub use convert::{array_to_maps, object_to_map, parse_body, to_node};
pub use parse::parse_result;
pub use query::{split_path, Query};
