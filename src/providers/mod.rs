//! Provider adapters
//!
//! One adapter per catalog provider. An adapter is mostly data: a table of
//! [`ObjectSpec`](crate::handlers::ObjectSpec)s plus endpoint-support rules,
//! with overrides only where a provider's API cannot be described
//! declaratively (HubSpot search and batch writes, webhook lifecycles,
//! envelope errors).

mod catalog;
mod signature;
mod traits;

pub mod calendly;
pub mod chorus;
pub mod granola;
pub mod hubspot;
pub mod klaviyo;
pub mod lemlist;
pub mod loxo;
pub mod phoneburner;
pub mod revenuecat;
pub mod ringcentral;
pub mod slack;
pub mod snapchatads;
pub mod stripe;
pub mod supersend;
pub mod talkdesk;
pub mod xero;

pub use catalog::{join_module_url, provider_info, provider_names, ModuleInfo, ProviderInfo};
pub use traits::{snake_case, Provider, Webhooks};

use crate::error::{Error, Result};
use crate::handlers::ObjectSpec;
use crate::schema::provider_schemas;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Hubspot,
    Klaviyo,
    Calendly,
    Slack,
    Xero,
    Stripe,
    SnapchatAds,
    RevenueCat,
    Loxo,
    Lemlist,
    PhoneBurner,
    Talkdesk,
    RingCentral,
    Chorus,
    Granola,
    Supersend,
}

impl ProviderName {
    pub const ALL: [Self; 16] = [
        Self::Hubspot,
        Self::Klaviyo,
        Self::Calendly,
        Self::Slack,
        Self::Xero,
        Self::Stripe,
        Self::SnapchatAds,
        Self::RevenueCat,
        Self::Loxo,
        Self::Lemlist,
        Self::PhoneBurner,
        Self::Talkdesk,
        Self::RingCentral,
        Self::Chorus,
        Self::Granola,
        Self::Supersend,
    ];

    /// Catalog key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hubspot => "hubspot",
            Self::Klaviyo => "klaviyo",
            Self::Calendly => "calendly",
            Self::Slack => "slack",
            Self::Xero => "xero",
            Self::Stripe => "stripe",
            Self::SnapchatAds => "snapchatads",
            Self::RevenueCat => "revenuecat",
            Self::Loxo => "loxo",
            Self::Lemlist => "lemlist",
            Self::PhoneBurner => "phoneburner",
            Self::Talkdesk => "talkdesk",
            Self::RingCentral => "ringcentral",
            Self::Chorus => "chorus",
            Self::Granola => "granola",
            Self::Supersend => "supersend",
        }
    }

    /// The adapter of this provider
    pub fn adapter(&self) -> Arc<dyn Provider> {
        match self {
            Self::Hubspot => Arc::new(hubspot::Hubspot),
            Self::Klaviyo => Arc::new(klaviyo::Klaviyo),
            Self::Calendly => Arc::new(calendly::Calendly),
            Self::Slack => Arc::new(slack::Slack),
            Self::Xero => Arc::new(xero::Xero),
            Self::Stripe => Arc::new(stripe::Stripe),
            Self::SnapchatAds => Arc::new(snapchatads::SnapchatAds),
            Self::RevenueCat => Arc::new(revenuecat::RevenueCat),
            Self::Loxo => Arc::new(loxo::Loxo),
            Self::Lemlist => Arc::new(lemlist::Lemlist),
            Self::PhoneBurner => Arc::new(phoneburner::PhoneBurner),
            Self::Talkdesk => Arc::new(talkdesk::Talkdesk),
            Self::RingCentral => Arc::new(ringcentral::RingCentral),
            Self::Chorus => Arc::new(chorus::Chorus),
            Self::Granola => Arc::new(granola::Granola),
            Self::Supersend => Arc::new(supersend::Supersend),
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| Error::UnknownProvider {
                name: s.to_string(),
            })
    }
}

/// Object description built from a static schema entry
///
/// The entry's URL path and response key become the object path and records
/// path; pagination and the rest are left to the caller.
pub(crate) fn schema_spec(provider: ProviderName, module: &str, object: &str) -> Result<ObjectSpec> {
    let schemas =
        provider_schemas(provider.as_str())?.ok_or_else(|| Error::object_not_found(object))?;
    let entry = schemas.lookup(module, object)?;
    Ok(ObjectSpec::new(
        entry.display_name.as_str(),
        entry.url_path.as_str(),
        entry.response_key.as_str(),
    ))
}

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;
