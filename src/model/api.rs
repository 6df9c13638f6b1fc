//! Data-call configuration and result types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved operation id: answered directly by the language model instead of
/// a mock template or live endpoint.
pub const KNOWLEDGE_OP_ID: &str = "general/ask";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "PATCH")]
    Patch,
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Post
    }
}

/// A concrete, parameter-bound call against the data-fetch backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallConfig {
    /// Operation id, e.g. `flights/search`.
    pub api_id: String,
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

impl ApiCallConfig {
    pub fn new(api_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_id: api_id.into(),
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Outcome of one data call. Success carries data, failure carries an error
/// message and status; never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status_code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            status_code: Some(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_success_xor_error() {
        let ok = ApiResponse::ok(json!({"x": 1}));
        assert!(ok.success && ok.data.is_some() && ok.error.is_none());

        let err = ApiResponse::error("boom");
        assert!(!err.success && err.data.is_none());
        assert_eq!(err.error.as_deref(), Some("boom"));
        assert_eq!(err.status_code, Some(500));
    }
}
