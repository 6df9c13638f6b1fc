//! Request/response DTOs for the HTTP surface

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GlobalStyle, ModuleInstance, RequestContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub user_input: String,
    #[serde(default)]
    pub context: Option<RequestContext>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanResponse {
    pub success: bool,
    pub global_style: GlobalStyle,
    pub modules: Vec<ModuleInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteInteractionRequest {
    pub instance_id: String,
    pub action: String,
    #[serde(default)]
    pub context: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteInteractionResponse {
    pub success: bool,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
