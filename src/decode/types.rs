//! Decoder types

/// How records are laid out at the records path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordsLayout {
    /// A JSON array of records
    #[default]
    Array,
    /// A JSON object whose values are the records
    MapValues,
}

/// Where records live in a response and how each item is unwrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordDecoder {
    /// Dotted path to the records; empty for the body itself
    pub path: &'static str,
    pub layout: RecordsLayout,
    /// Each item is `{..., <key>: {record}}`; the inner object is the record
    pub unwrap: Option<&'static str>,
}

impl RecordDecoder {
    /// Records array at `path`
    pub const fn at(path: &'static str) -> Self {
        Self {
            path,
            layout: RecordsLayout::Array,
            unwrap: None,
        }
    }

    /// Records stored as the values of an object at `path`
    pub const fn map_values(path: &'static str) -> Self {
        Self {
            path,
            layout: RecordsLayout::MapValues,
            unwrap: None,
        }
    }

    /// Unwrap each item through `key`
    #[must_use]
    pub const fn unwrapping(mut self, key: &'static str) -> Self {
        self.unwrap = Some(key);
        self
    }
}

/// How the projected view of a record is derived from the raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordShape {
    /// Fields are read from the record as-is
    #[default]
    Plain,

    /// The object under `key` is promoted to the top level
    /// (`attributes` for JSON:API, `properties` for HubSpot)
    Nested { key: &'static str, required: bool },

    /// Entries of the `array` are promoted as `custom_field_key(label) -> value`
    CustomFields {
        array: &'static str,
        label: &'static str,
        value: &'static str,
    },
}
