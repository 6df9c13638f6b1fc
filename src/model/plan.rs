//! Execution plan and rendered instance types
//!
//! An `ExecutionPlan` is produced fresh for every request and discarded once
//! the response is assembled; nothing here is persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::ApiCallConfig;
use super::module::ModuleDefinition;
use super::style::{GlobalStyle, ModuleStyle};

/// One selected module inside a plan. `instance_id` is unique within the
/// plan; `priority` is ascending render order with 1 as the expanded primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionModuleConfig {
    pub instance_id: String,
    pub module_id: String,
    pub priority: u32,
    pub default_expanded: bool,
    pub style: ModuleStyle,
    pub initial_api: ApiCallConfig,
    #[serde(default)]
    pub interaction_apis: HashMap<String, ApiCallConfig>,
    /// Short human-readable reason the planner selected this module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub global_style: GlobalStyle,
    pub modules: Vec<ExecutionModuleConfig>,
}

impl ExecutionPlan {
    pub fn new(global_style: GlobalStyle, modules: Vec<ExecutionModuleConfig>) -> Self {
        Self {
            global_style,
            modules,
        }
    }
}

/// Optional per-request hints forwarded to the planner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_modules: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_preferences: HashMap<String, Value>,
}

/// A plan entry after its data has been fetched and mapped: everything the
/// renderer needs for one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInstance {
    pub instance_id: String,
    pub module_id: String,
    pub priority: u32,
    pub default_expanded: bool,
    pub style: ModuleStyle,
    pub data: Value,
    pub module_config: ModuleDefinition,
    #[serde(default)]
    pub interaction_apis: HashMap<String, ApiCallConfig>,
    pub expanded: bool,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModuleInstance {
    pub fn assemble(config: &ExecutionModuleConfig, data: Value, def: ModuleDefinition) -> Self {
        Self {
            instance_id: config.instance_id.clone(),
            module_id: config.module_id.clone(),
            priority: config.priority,
            default_expanded: config.default_expanded,
            style: config.style.clone(),
            data,
            module_config: def,
            interaction_apis: config.interaction_apis.clone(),
            expanded: config.default_expanded,
            loading: false,
            error: None,
            reason: config.reason.clone(),
        }
    }
}
