//! Trigger and result artifact payloads

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};
use crate::types::JobIndex;

/// Field a worker uses to report a failed job
pub const ERROR_FIELD: &str = "error";

/// Field carrying the request identifier on both artifacts
pub const REQUEST_ID_FIELD: &str = "request_id";

/// Pending job published through the trigger artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub index: JobIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

impl JobDescriptor {
    /// Job addressed by its position in the sample sequence
    pub fn sequential(index: u64) -> Self {
        Self {
            index: JobIndex::Sequential(index),
            custom_params: None,
            request_id: None,
        }
    }

    /// Job carrying caller-supplied parameters
    pub fn custom(params: Map<String, Value>) -> Self {
        Self {
            index: JobIndex::Custom,
            custom_params: Some(params),
            request_id: None,
        }
    }

    /// Tag the descriptor so the matching result can be told apart from orphans
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Render the descriptor the way it is written to disk
    pub fn to_pretty_json(&self) -> SharedResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }

    pub fn from_json(content: &[u8]) -> SharedResult<Self> {
        serde_json::from_slice(content).map_err(|e| SharedError::DeserializationError {
            message: e.to_string(),
        })
    }
}

/// Outcome written by the worker. Opaque apart from the `error` and
/// `request_id` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPayload(Map<String, Value>);

impl ResultPayload {
    /// Parse raw artifact content; anything other than a JSON object is corrupt
    pub fn parse(content: &[u8]) -> SharedResult<Self> {
        let value: Value = serde_json::from_slice(content).map_err(|e| {
            SharedError::DeserializationError {
                message: e.to_string(),
            }
        })?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(SharedError::ResultNotObject),
        }
    }

    /// Whether the worker reported a failure for this job
    pub fn is_failure(&self) -> bool {
        self.0.contains_key(ERROR_FIELD)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.0.get(REQUEST_ID_FIELD).and_then(Value::as_str)
    }

    /// Whether this result may answer the request tagged `request_id`.
    /// Untagged results come from workers that do not echo the identifier.
    pub fn matches_request(&self, request_id: &Uuid) -> bool {
        match self.request_id() {
            Some(tag) => Uuid::parse_str(tag).map(|tag| tag == *request_id).unwrap_or(false),
            None => true,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ResultPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
