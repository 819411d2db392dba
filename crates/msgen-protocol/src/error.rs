//! Service error payloads and codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error body returned by any endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    /// Error code from the registry in [`codes`].
    pub code: String,

    /// Human-readable, single-line message.
    pub message: String,

    /// Optional machine-readable details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, serde_json::Value>>,
}

impl ApiErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach machine-readable detail to the error.
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Typed service rejection derived from an [`ApiErrorPayload`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: String,
    pub message: String,
}

impl From<ApiErrorPayload> for ServiceError {
    fn from(payload: ApiErrorPayload) -> Self {
        Self {
            code: payload.code,
            message: payload.message,
        }
    }
}

/// Well-known error codes emitted by the service.
pub mod codes {
    pub const JOB_NOT_FOUND: &str = "JOB_NOT_FOUND";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const GENERATION_FAILED: &str = "GENERATION_FAILED";
    pub const RENDER_FAILED: &str = "RENDER_FAILED";
}
