//! Catalog module types
//!
//! `ModuleSummary` is the lightweight retrieval/prompting view; the full
//! `ModuleDefinition` with its API operation map is loaded on demand and
//! treated as immutable for the life of the process.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::HttpMethod;
use super::style::Layout;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParameter {
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// One named operation a module can perform against the data backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub parameters: HashMap<String, ApiParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIdentity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Full catalog entry, loaded on demand and cached process-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    #[serde(flatten)]
    pub identity: ModuleIdentity,
    pub recommended_layout: Layout,
    #[serde(default)]
    pub apis: HashMap<String, ApiDefinition>,
}

/// Retrieval/prompting view of a module. `apis` is empty until the planning
/// shortlist is enriched from the full definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub recommended_layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apis: Option<HashMap<String, ApiDefinition>>,
}

impl ModuleSummary {
    pub fn from_definition(def: &ModuleDefinition) -> Self {
        Self {
            id: def.identity.id.clone(),
            name: def.identity.name.clone(),
            description: def.identity.description.clone(),
            keywords: def.identity.keywords.clone(),
            recommended_layout: def.recommended_layout,
            apis: Some(def.apis.clone()),
        }
    }
}
