//! Operation handlers
//!
//! Generic read, write, delete, metadata and single-record handlers. Each
//! one closes over an [`ObjectSpec`], the declarative description of how an
//! adapter exposes an object, and performs at most one network call
//! (metadata sampling issues a one-record read).

mod context;
mod delete;
mod metadata;
mod read;
mod types;
mod write;

pub use context::HandlerContext;
pub use delete::delete;
pub use metadata::{sample_metadata, static_metadata};
pub use read::{
    build_read_request, get_listed_record, get_record, parse_read_response, read, ReadRequest,
};
pub use types::{
    BodyEncoding, BodyWrap, IdLocation, Incremental, ObjectSpec, PageSize, UpdatePath, WriteSpec,
};
pub use write::{extract_record_id, write};
