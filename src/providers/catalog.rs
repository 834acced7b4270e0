//! Provider catalog embedded in the binary
//!
//! Base URLs and module registries of every supported provider, parsed once
//! from `providers/catalog.yaml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Catalog YAML, embedded at compile time
static CATALOG_YAML: &str = include_str!("../../providers/catalog.yaml");

/// Parsed catalog; a parse failure is kept as its message
static CATALOG: LazyLock<std::result::Result<HashMap<String, ProviderInfo>, String>> =
    LazyLock::new(|| {
        let raw: BTreeMap<String, ProviderInfo> =
            serde_yaml::from_str(CATALOG_YAML).map_err(|e| e.to_string())?;
        Ok(raw
            .into_iter()
            .map(|(name, mut info)| {
                info.name.clone_from(&name);
                (name, info)
            })
            .collect())
    });

/// One sub-API of a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub label: String,
    pub version: String,
    /// Module root relative to the base URL; empty for the base itself
    #[serde(default)]
    pub path: String,
    /// Overrides the provider base URL for this module
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Static information about a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    /// Catalog key, filled after parsing
    #[serde(skip)]
    pub name: String,
    pub display_name: String,
    pub base_url: String,
    pub default_module: String,
    pub modules: BTreeMap<String, ModuleInfo>,
}

impl ProviderInfo {
    /// Resolve a module id, falling back to the default module
    pub fn module(&self, id: Option<&str>) -> Result<(&str, &ModuleInfo)> {
        let id = id.filter(|m| !m.is_empty()).unwrap_or(&self.default_module);
        self.modules
            .get_key_value(id)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| Error::UnknownModule {
                provider: self.name.clone(),
                module: id.to_string(),
            })
    }

    /// Base URL of a module
    pub fn module_base_url<'a>(&'a self, module: &'a ModuleInfo) -> &'a str {
        module.base_url.as_deref().unwrap_or(&self.base_url)
    }
}

/// Look up a provider in the catalog
pub fn provider_info(name: &str) -> Result<&'static ProviderInfo> {
    let catalog = CATALOG
        .as_ref()
        .map_err(|message| Error::Other(format!("embedded provider catalog: {message}")))?;
    catalog.get(name).ok_or_else(|| Error::UnknownProvider {
        name: name.to_string(),
    })
}

/// Join a base URL and a module path into the module root
pub fn join_module_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Names of all catalog providers, sorted
pub fn provider_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CATALOG
        .as_ref()
        .map(|c| c.keys().map(String::as_str).collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}
