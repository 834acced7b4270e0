//! Write, batch-write and delete envelopes

use crate::error::Error;
use crate::urlbuilder::Headers;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Input of a single-record create or update
#[derive(Debug, Clone, Default)]
pub struct WriteParams {
    pub object_name: String,
    /// Empty for create, set for update
    pub record_id: Option<String>,
    pub record_data: Value,
    pub associations: Option<Value>,
    /// Extra headers forwarded to the provider
    pub headers: Headers,
}

impl WriteParams {
    /// Create write params for an object
    pub fn new(object_name: impl Into<String>, record_data: Value) -> Self {
        Self {
            object_name: object_name.into(),
            record_data,
            ..Default::default()
        }
    }

    /// Target an existing record
    #[must_use]
    pub fn record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Attach associations
    #[must_use]
    pub fn associations(mut self, associations: Value) -> Self {
        self.associations = Some(associations);
        self
    }

    /// True when this write updates an existing record
    pub fn is_update(&self) -> bool {
        self.record_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Outcome of a single-record write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub success: bool,
    /// Echoes the input on update; extracted from the response on create
    pub record_id: String,
    /// Server echo, verbatim
    pub data: Option<Value>,
    /// Per-record error descriptors
    pub errors: Vec<Value>,
}

/// Batch write direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchWriteType {
    Create,
    Update,
}

impl BatchWriteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl FromStr for BatchWriteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            _ => Err(Error::UnknownWriteType {
                write_type: s.to_string(),
            }),
        }
    }
}

/// One record of a batch write
#[derive(Debug, Clone, Default)]
pub struct BatchItem {
    pub record_id: Option<String>,
    pub record: Value,
    pub associations: Option<Value>,
}

/// Input of a batch write
#[derive(Debug, Clone)]
pub struct BatchWriteParams {
    pub object_name: String,
    pub batch_type: BatchWriteType,
    pub items: Vec<BatchItem>,
}

/// Aggregate status of a batch write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Partial,
    Failure,
}

/// Outcome of a batch write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWriteResult {
    pub status: BatchStatus,
    pub success_count: usize,
    pub failure_count: usize,
    /// Per-record results in input order
    pub results: Vec<WriteResult>,
    /// Errors not attributable to a single record
    pub errors: Vec<Value>,
}

impl BatchWriteResult {
    /// Derive counts and status from per-record results
    pub fn from_results(results: Vec<WriteResult>, errors: Vec<Value>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        let failure_count = results.len() - success_count;
        let status = if failure_count == 0 {
            BatchStatus::Success
        } else if success_count == 0 {
            BatchStatus::Failure
        } else {
            BatchStatus::Partial
        };

        Self {
            status,
            success_count,
            failure_count,
            results,
            errors,
        }
    }
}

/// Input of a delete
#[derive(Debug, Clone, Default)]
pub struct DeleteParams {
    pub object_name: String,
    pub record_id: String,
}

impl DeleteParams {
    pub fn new(object_name: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            record_id: record_id.into(),
        }
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}
