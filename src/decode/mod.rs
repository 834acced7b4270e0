//! Record decoding module
//!
//! Supports: records arrays at a dotted path, records stored as a map keyed
//! by id, per-item unwrapping, nested attribute promotion and custom-field
//! promotion.
//!
//! # Overview
//!
//! A [`RecordDecoder`] pulls the raw records out of a response body. A
//! [`Marshaller`] then projects the requested fields from each record's
//! flattened view into a [`ReadResultRow`](crate::model::ReadResultRow),
//! keeping the raw record verbatim.

mod decoders;
mod types;

pub use decoders::{custom_field_key, get_marshaled_data, Marshaller};
pub use types::{RecordDecoder, RecordShape, RecordsLayout};
