//! Request validation.
//!
//! A [`QueryRequest`] is only constructible from input that passed every
//! check, so holding one means no process will be spawned for bad input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// Input payload as supplied by the parameter source.
///
/// Hosts hand the payload over either as raw JSON text typed by a user or
/// as an already-decoded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A validated query invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    payload: Value,
    query: String,
}

impl QueryRequest {
    /// Validate the raw parameters.
    ///
    /// Fails with [`QueryError::InvalidInput`] when the query is blank, the
    /// payload text is blank or not JSON, or a decoded payload is `null`.
    pub fn new(payload: Payload, query: impl Into<String>) -> Result<Self, QueryError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(QueryError::InvalidInput(
                "ZQuery statement cannot be empty".to_string(),
            ));
        }

        let payload = match payload {
            Payload::Text(text) => {
                if text.trim().is_empty() {
                    return Err(QueryError::InvalidInput(
                        "JSON data cannot be empty".to_string(),
                    ));
                }
                serde_json::from_str(&text).map_err(|e| {
                    QueryError::InvalidInput(format!("Invalid JSON data provided: {e}"))
                })?
            }
            Payload::Json(Value::Null) => {
                return Err(QueryError::InvalidInput(
                    "Invalid JSON data provided: payload is null".to_string(),
                ));
            }
            Payload::Json(value) => value,
        };

        Ok(Self { payload, query })
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Compact JSON text written to the engine's stdin.
    pub fn serialized_payload(&self) -> String {
        // Serializing a `Value` into a `String` cannot fail.
        self.payload.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
