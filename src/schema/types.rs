//! Schema types

use crate::error::{Error, Result};
use crate::model::{FieldMetadata, ObjectMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One object of a static schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    pub display_name: String,
    /// Path relative to the module root; may contain `{{ }}` templates
    pub url_path: String,
    /// Dotted path to the records array in list responses
    #[serde(default)]
    pub response_key: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldMetadata>,
}

impl SchemaEntry {
    /// Convert to object metadata, checking field invariants
    pub fn to_metadata(&self) -> Result<ObjectMetadata> {
        let mut metadata = ObjectMetadata::new(&self.display_name);
        for (name, field) in &self.fields {
            field.validate()?;
            metadata.add_field(name, field.clone());
        }
        Ok(metadata)
    }
}

/// Objects of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSchemas {
    pub objects: BTreeMap<String, SchemaEntry>,
}

/// All static schemas of one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSchemas {
    pub modules: BTreeMap<String, ModuleSchemas>,
}

impl ProviderSchemas {
    /// Look up an object; unknown modules and objects are `ObjectNotFound`
    pub fn lookup(&self, module: &str, object: &str) -> Result<&SchemaEntry> {
        self.modules
            .get(module)
            .and_then(|m| m.objects.get(object))
            .ok_or_else(|| Error::object_not_found(object))
    }

    /// Object names of a module
    pub fn object_names(&self, module: &str) -> Vec<&str> {
        self.modules
            .get(module)
            .map(|m| m.objects.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
