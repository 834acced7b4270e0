//! Embedded static schemas

use super::types::ProviderSchemas;
use crate::error::{Error, Result, ResultExt};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Schema YAML embedded in the binary, keyed by provider
static EMBEDDED_SCHEMAS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("klaviyo", include_str!("../../schemas/klaviyo.yaml"));
    m.insert("granola", include_str!("../../schemas/granola.yaml"));
    m.insert("calendly", include_str!("../../schemas/calendly.yaml"));
    m.insert("supersend", include_str!("../../schemas/supersend.yaml"));
    m.insert("revenuecat", include_str!("../../schemas/revenuecat.yaml"));
    m.insert("phoneburner", include_str!("../../schemas/phoneburner.yaml"));
    m.insert("talkdesk", include_str!("../../schemas/talkdesk.yaml"));
    m
});

/// Parsed schemas; a parse failure is kept as its message
static PARSED_SCHEMAS: LazyLock<HashMap<&'static str, std::result::Result<ProviderSchemas, String>>> =
    LazyLock::new(|| {
        EMBEDDED_SCHEMAS
            .iter()
            .map(|(name, yaml)| {
                let parsed = serde_yaml::from_str::<ProviderSchemas>(yaml).map_err(|e| e.to_string());
                (*name, parsed)
            })
            .collect()
    });

/// Static schemas of a provider, `None` when it has none
pub fn provider_schemas(provider: &str) -> Result<Option<&'static ProviderSchemas>> {
    match PARSED_SCHEMAS.get(provider) {
        None => Ok(None),
        Some(Ok(schemas)) => Ok(Some(schemas)),
        Some(Err(message)) => Err::<Option<&'static ProviderSchemas>, _>(Error::Other(message.clone()))
            .with_context(|| format!("embedded schema for '{provider}'")),
    }
}

/// Real URL path of a static-schema object
pub fn lookup_raw_url_path(provider: &str, module: &str, object: &str) -> Result<&'static str> {
    let schemas = provider_schemas(provider)?.ok_or_else(|| Error::object_not_found(object))?;
    Ok(schemas.lookup(module, object)?.url_path.as_str())
}
