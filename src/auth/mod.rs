//! Authentication module
//!
//! Supports: API Key, Basic, Bearer, Custom Headers
//!
//! The `Authenticator` applies credentials to every outgoing request. Token
//! acquisition and refresh happen outside this crate; callers hand in a
//! ready credential.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, Location};
