// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Connectors
//!
//! One uniform interface over many third-party SaaS HTTP APIs: read with
//! pagination and incremental filters, write, batch write, delete, describe
//! objects, and manage webhook subscriptions.
//!
//! ## Features
//!
//! - **Uniform envelopes**: the same `ReadParams`/`ReadResult` for every provider
//! - **Declarative adapters**: most providers are a table of object descriptions
//! - **Typed errors**: provider failures map onto one error taxonomy
//! - **Webhooks**: subscribe, verify signatures, normalize events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_connectors::{
//!     AuthConfig, Connector, ConnectorParams, HttpClient, HttpClientConfig, ProviderName,
//!     ReadParams, Result,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let http = HttpClient::with_auth(HttpClientConfig::default(), AuthConfig::bearer("pat-..."))?;
//!     let connector = Connector::new(ConnectorParams::new(ProviderName::Hubspot, http))?;
//!
//!     let ctx = CancellationToken::new();
//!     let mut params = ReadParams::new("contacts").fields(["email", "firstname"]);
//!     loop {
//!         let page = connector.read(&ctx, &params).await?;
//!         for row in &page.data {
//!             println!("{} {:?}", row.id, row.fields);
//!         }
//!         if page.done {
//!             break;
//!         }
//!         params = params.next_page(page.next_page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Connector                               │
//! │  validate → support check → post-auth (once) → adapter          │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Handlers │   HTTP    │   Paginate    │  Decode   │   Schema    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Read     │ Auth      │ URL field     │ Records   │ Static YAML │
//! │ Write    │ JSON      │ Cursor        │ Flatten   │ Sampled     │
//! │ Delete   │ Errors    │ Offsets       │ Unwrap    │ Type map    │
//! │ Metadata │ Cancel    │ Page count    │ Custom    │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error taxonomy
pub mod error;

/// Common types and type aliases
pub mod types;

/// Typed queries over JSON bodies
pub mod jsonquery;

/// URL, header and form builders
pub mod urlbuilder;

/// Authentication applied by the transport
pub mod auth;

/// HTTP transport and error interpretation
pub mod http;

/// Template interpolation
pub mod template;

/// Next-page rules
pub mod pagination;

/// Record extraction and marshalling
pub mod decode;

/// Static schemas and schema inference
pub mod schema;

/// Uniform request and response envelopes
pub mod model;

/// Generic operation handlers
pub mod handlers;

/// Provider catalog and adapters
pub mod providers;

/// Connector runtime
pub mod connector;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiErrorKind, Error, ErrorKind, Result};
pub use types::*;

pub use auth::AuthConfig;
pub use connector::{Connector, ConnectorParams, EndpointSupport, Support, SupportRule};
pub use http::{HttpClient, HttpClientConfig};
pub use model::*;
pub use providers::{provider_info, provider_names, ProviderInfo, ProviderName};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
