//! Object metadata envelopes

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Normalized field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    String,
    Boolean,
    Int,
    Float,
    Date,
    Datetime,
    SingleSelect,
    MultiSelect,
    #[default]
    Other,
}

impl ValueType {
    /// True for enumerations that may carry `values`
    pub fn is_select(&self) -> bool {
        matches!(self, Self::SingleSelect | Self::MultiSelect)
    }
}

/// One allowed value of an enumeration field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub value: String,
    pub display_value: String,
}

/// Description of a single field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub display_name: String,
    pub value_type: ValueType,
    /// Type name as reported by the provider
    #[serde(default)]
    pub provider_type: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<FieldValue>>,
}

impl FieldMetadata {
    pub fn new(
        display_name: impl Into<String>,
        value_type: ValueType,
        provider_type: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            value_type,
            provider_type: provider_type.into(),
            read_only: false,
            values: None,
        }
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Attach enumeration values; only select types may carry them
    pub fn with_values(mut self, values: Vec<FieldValue>) -> Result<Self> {
        if !self.value_type.is_select() {
            return Err(Error::invalid_params(format!(
                "field '{}' has values but is not a select type",
                self.display_name
            )));
        }
        self.values = Some(values);
        Ok(self)
    }

    /// Check the values/type invariant
    pub fn validate(&self) -> Result<()> {
        if self.values.is_some() && !self.value_type.is_select() {
            return Err(Error::invalid_params(format!(
                "field '{}' has values but is not a select type",
                self.display_name
            )));
        }
        Ok(())
    }
}

/// Description of an object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub display_name: String,
    pub fields: BTreeMap<String, FieldMetadata>,
    /// Legacy flat field name to display name
    pub fields_map: BTreeMap<String, String>,
}

impl ObjectMetadata {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Add a field, keeping the legacy map in sync
    pub fn add_field(&mut self, name: impl Into<String>, field: FieldMetadata) {
        let name = name.into();
        self.fields_map
            .insert(name.clone(), field.display_name.clone());
        self.fields.insert(name, field);
    }
}

/// Per-object metadata and per-object failures
#[derive(Debug, Default)]
pub struct ListObjectMetadataResult {
    pub result: HashMap<String, ObjectMetadata>,
    pub errors: HashMap<String, Error>,
}
