//! Object schema module
//!
//! Provides object metadata without a provider describe endpoint.
//!
//! # Features
//!
//! - **Static schemas**: per-provider tables embedded at compile time
//!   (`schemas/<provider>.yaml`), keyed by module and object
//! - **Sample inference**: field types derived from one sampled record
//! - **Provider types**: mapping of provider `type`/`fieldType` pairs to
//!   normalized value types

mod inference;
mod registry;
mod types;

pub use inference::{infer_object_metadata, infer_value_type, map_property_type};
pub use registry::{lookup_raw_url_path, provider_schemas};
pub use types::{ModuleSchemas, ProviderSchemas, SchemaEntry};
