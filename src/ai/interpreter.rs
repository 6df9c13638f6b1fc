//! Plan interpretation
//!
//! `PlanInterpreter` drives the two model stages. Planning: retrieve
//! candidates, enrich the shortlist with full API definitions, prompt the
//! Planner, then parse, validate, and convert its JSON into an
//! `ExecutionPlan`. Unmatched input never yields an empty plan: retrieval or
//! conversion coming up empty falls back to a generic knowledge-lookup plan.
//! Mapping: reshape raw fetched data into a layout schema; on any failure the
//! raw data is handed back unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::ModuleCatalog;
use crate::error::PlanError;
use crate::llm::ChatClient;
use crate::model::{
    ApiCallConfig, ExecutionModuleConfig, ExecutionPlan, GlobalStyle, Layout, ModuleStyle,
    ModuleSummary, RequestContext, KNOWLEDGE_OP_ID,
};
use crate::utils::{with_retry, RetryOptions};

use super::prompts;
use super::retriever::Retriever;

/// Module id used for the fallback plan's knowledge-lookup card.
pub const FALLBACK_MODULE_ID: &str = "info_card";

/// Final layout is decided here, per module id. Whatever layout the planner
/// suggests is advisory only and never trusted for rendering.
pub fn layout_for_module(module_id: &str) -> Layout {
    match module_id {
        "info_card" => Layout::InfoDisplay,
        "line_general_agent" | "general_agent" | "orchestration_agent" => {
            Layout::InteractiveAction
        }
        "meeting_view" | "map_view" => Layout::MapView,
        _ => Layout::ScrollableList,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlannerResponse {
    #[serde(default)]
    global_style: Option<GlobalStyle>,
    modules: Vec<PlannerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlannerEntry {
    target_module_id: String,
    #[serde(default)]
    priority: Option<u32>,
    #[serde(default)]
    api_call: Option<PlannerApiCall>,
    /// Legacy shape carried bare parameters instead of an apiCall object.
    #[serde(default)]
    parameters: Option<HashMap<String, Value>>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlannerApiCall {
    id: String,
    #[serde(default)]
    params: HashMap<String, Value>,
}

pub struct PlanInterpreter {
    client: Arc<dyn ChatClient>,
    catalog: Arc<ModuleCatalog>,
    top_k: usize,
    retry: RetryOptions,
}

impl PlanInterpreter {
    pub fn new(client: Arc<dyn ChatClient>, catalog: Arc<ModuleCatalog>, top_k: usize) -> Self {
        Self {
            client,
            catalog,
            top_k,
            retry: RetryOptions::default(),
        }
    }

    /// Generate an execution plan for one user request.
    pub async fn generate_plan(
        &self,
        user_input: &str,
        context: Option<&RequestContext>,
        available: &[ModuleSummary],
    ) -> Result<ExecutionPlan, PlanError> {
        let candidates = Retriever::search(user_input, available, self.top_k);
        tracing::info!("Retrieved {} candidate modules", candidates.len());

        if candidates.is_empty() {
            tracing::info!("No candidates matched; using fallback plan");
            return Ok(Self::fallback_plan(user_input));
        }

        // Enrich only the shortlist with full API definitions; the whole
        // catalog is never sent to the model.
        let candidates = self.enrich(candidates).await;

        let user_content = match context {
            Some(ctx) => format!(
                "{}\n\nRequest context: {}",
                user_input,
                serde_json::to_string(ctx).unwrap_or_default()
            ),
            None => user_input.to_string(),
        };
        let messages = prompts::planner_messages(&user_content, &candidates);

        let response = with_retry(self.retry, || self.client.send(&messages)).await?;

        let parsed = parse_planner_response(&response)?;
        let global_style = parsed.global_style.unwrap_or_default();
        let modules = convert_entries(parsed.modules, &candidates);

        if modules.is_empty() {
            tracing::warn!("Planner selected no usable modules; using fallback plan");
            return Ok(Self::fallback_plan(user_input));
        }

        tracing::info!("Planner selected {} modules", modules.len());
        Ok(ExecutionPlan::new(global_style, modules))
    }

    /// Reshape raw fetched data into the target layout's item schema. Never
    /// errors: any model or parse failure returns the raw data untouched.
    pub async fn map_to_ui(&self, raw: &Value, layout: Layout) -> Value {
        let messages = prompts::mapper_messages(raw, layout);

        let response = match self.client.send(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Mapper model call failed, keeping raw data: {}", e);
                return raw.clone();
            }
        };

        match extract_json(&response) {
            Ok(mapped) => mapped,
            Err(e) => {
                tracing::warn!("Mapper output unparseable, keeping raw data: {}", e);
                raw.clone()
            }
        }
    }

    /// Fixed plan for input no module matched: one expanded knowledge-lookup
    /// card carrying the raw user text.
    pub fn fallback_plan(user_input: &str) -> ExecutionPlan {
        let mut parameters = HashMap::new();
        parameters.insert("query".to_string(), Value::String(user_input.to_string()));

        let module = ExecutionModuleConfig {
            instance_id: format!(
                "{}-{}-0",
                FALLBACK_MODULE_ID,
                chrono::Utc::now().timestamp_millis()
            ),
            module_id: FALLBACK_MODULE_ID.to_string(),
            priority: 1,
            default_expanded: true,
            style: ModuleStyle::for_priority(Layout::InfoDisplay, 1),
            initial_api: ApiCallConfig::new(KNOWLEDGE_OP_ID, format!("/api/{}", KNOWLEDGE_OP_ID))
                .with_parameters(parameters),
            interaction_apis: HashMap::new(),
            reason: Some("No catalog module matched; answering directly".to_string()),
        };

        ExecutionPlan::new(GlobalStyle::default(), vec![module])
    }

    async fn enrich(&self, mut candidates: Vec<ModuleSummary>) -> Vec<ModuleSummary> {
        let ids: Vec<String> = candidates.iter().map(|m| m.id.clone()).collect();
        let definitions = self.catalog.definitions(&ids).await;

        for candidate in &mut candidates {
            if let Some(def) = definitions.get(&candidate.id) {
                candidate.apis = Some(def.apis.clone());
            }
        }
        candidates
    }
}

/// Extract the first JSON object or array span from model output, tolerating
/// surrounding prose and markdown fencing, and validate it into the expected
/// planner shape.
fn parse_planner_response(response: &str) -> Result<PlannerResponse, PlanError> {
    let value = extract_json(response)?;

    // Canonical shape: object with a "modules" array.
    if value.get("modules").map_or(false, Value::is_array) {
        return serde_json::from_value(value)
            .map_err(|e| PlanError::Validation(format!("bad modules array: {}", e)));
    }

    // Legacy single-module shape: a bare entry object.
    if value.get("targetModuleId").is_some() {
        let entry: PlannerEntry = serde_json::from_value(value)
            .map_err(|e| PlanError::Validation(format!("bad module entry: {}", e)))?;
        return Ok(PlannerResponse {
            global_style: None,
            modules: vec![entry],
        });
    }

    // A bare array of entries.
    if value.is_array() {
        let modules: Vec<PlannerEntry> = serde_json::from_value(value)
            .map_err(|e| PlanError::Validation(format!("bad module entries: {}", e)))?;
        return Ok(PlannerResponse {
            global_style: None,
            modules,
        });
    }

    Err(PlanError::Validation(
        "response has no 'modules' array".to_string(),
    ))
}

/// Find and parse the widest `{...}` or `[...]` span in `text`, trying the
/// earlier-starting span first and falling back to the other. The fallback
/// keeps stray brackets in surrounding prose (citations, markdown links) from
/// shadowing a valid object or array.
fn extract_json(text: &str) -> Result<Value, PlanError> {
    let trimmed = text.trim();

    let mut spans = Vec::new();
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            spans.push((start, &trimmed[start..=end]));
        }
    }
    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            spans.push((start, &trimmed[start..=end]));
        }
    }
    spans.sort_by_key(|(start, _)| *start);

    if spans.is_empty() {
        return Err(PlanError::Parse(
            "no JSON object or array in response".to_string(),
        ));
    }

    let mut last_err = None;
    for (_, span) in spans {
        match serde_json::from_str(span) {
            Ok(value) => return Ok(value),
            Err(e) => last_err = Some(e),
        }
    }

    Err(PlanError::Parse(format!(
        "invalid JSON span: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Convert planner entries into execution module configs. Priority and
/// expansion come from the declared priority or list position (first entry is
/// the expanded primary); endpoints resolve against the enriched API
/// definitions when the operation is known to the catalog.
fn convert_entries(
    entries: Vec<PlannerEntry>,
    candidates: &[ModuleSummary],
) -> Vec<ExecutionModuleConfig> {
    let now_millis = chrono::Utc::now().timestamp_millis();

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let module_id = entry.target_module_id;
            let priority = entry.priority.unwrap_or(index as u32 + 1);
            let layout = layout_for_module(&module_id);
            let summary = candidates.iter().find(|m| m.id == module_id);

            let initial_api = build_initial_api(
                &module_id,
                summary,
                entry.api_call,
                entry.parameters.unwrap_or_default(),
            );

            ExecutionModuleConfig {
                instance_id: format!("{}-{}-{}", module_id, now_millis, index),
                module_id,
                priority,
                default_expanded: priority == 1,
                style: ModuleStyle::for_priority(layout, priority),
                initial_api,
                interaction_apis: interaction_apis(summary),
                reason: entry.reason,
            }
        })
        .collect()
}

fn build_initial_api(
    module_id: &str,
    summary: Option<&ModuleSummary>,
    api_call: Option<PlannerApiCall>,
    legacy_parameters: HashMap<String, Value>,
) -> ApiCallConfig {
    let (op_id, parameters) = match api_call {
        Some(call) => (call.id, call.params),
        // Legacy entries name no operation; take the module's first declared
        // one, or a conventional default.
        None => {
            let op_id = summary
                .and_then(|s| s.apis.as_ref())
                .and_then(|apis| {
                    let mut ids: Vec<&String> = apis.values().map(|a| &a.id).collect();
                    ids.sort_unstable();
                    ids.first().map(|id| id.to_string())
                })
                .unwrap_or_else(|| format!("{}/search", module_id));
            (op_id, legacy_parameters)
        }
    };

    let declared = summary
        .and_then(|s| s.apis.as_ref())
        .and_then(|apis| apis.values().find(|a| a.id == op_id));

    let mut config = match declared {
        Some(def) => {
            let mut c = ApiCallConfig::new(&op_id, &def.endpoint);
            c.method = def.method;
            c
        }
        None => ApiCallConfig::new(&op_id, format!("/api/{}", op_id)),
    };
    config.parameters = parameters;
    config
}

/// Expose every `*/detail` operation the module declares as its item-click
/// interaction.
fn interaction_apis(summary: Option<&ModuleSummary>) -> HashMap<String, ApiCallConfig> {
    let mut out = HashMap::new();

    if let Some(apis) = summary.and_then(|s| s.apis.as_ref()) {
        if let Some(def) = apis.values().find(|a| a.id.ends_with("/detail")) {
            let mut call = ApiCallConfig::new(&def.id, &def.endpoint);
            call.method = def.method;
            out.insert("onItemClick".to_string(), call);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiDefinition, HttpMethod};
    use std::collections::HashSet;

    fn summary_with_apis(id: &str) -> ModuleSummary {
        let mut apis = HashMap::new();
        apis.insert(
            "search".to_string(),
            ApiDefinition {
                id: format!("{}s/search", id),
                name: String::new(),
                description: String::new(),
                endpoint: format!("/api/{}s/search", id),
                method: HttpMethod::Post,
                parameters: HashMap::new(),
            },
        );
        apis.insert(
            "detail".to_string(),
            ApiDefinition {
                id: format!("{}s/detail", id),
                name: String::new(),
                description: String::new(),
                endpoint: format!("/api/{}s/detail", id),
                method: HttpMethod::Post,
                parameters: HashMap::new(),
            },
        );
        ModuleSummary {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            keywords: vec![],
            recommended_layout: Layout::ScrollableList,
            apis: Some(apis),
        }
    }

    #[test]
    fn test_extract_json_clean() {
        let value = extract_json(r#"{"modules": []}"#).unwrap();
        assert!(value.get("modules").is_some());
    }

    #[test]
    fn test_extract_json_with_markdown_fence() {
        let text = "```json\n{\"modules\": []}\n```";
        assert!(extract_json(text).is_ok());
    }

    #[test]
    fn test_extract_json_with_prose() {
        let text = "Here is the plan you asked for:\n{\"modules\": []}\nHope that helps!";
        assert!(extract_json(text).is_ok());
    }

    #[test]
    fn test_extract_json_bracketed_prose_before_object() {
        // A citation-style bracket in the prose must not shadow the object.
        let text = r#"Based on [1], here is the plan: {"modules": [{"targetModuleId": "flight"}]}"#;
        let value = extract_json(text).unwrap();
        assert!(value["modules"].is_array());
        assert!(parse_planner_response(text).is_ok());
    }

    #[test]
    fn test_extract_json_bare_array_stays_an_array() {
        let text = r#"[{"targetModuleId": "flight"}, {"targetModuleId": "hotel"}]"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_extract_json_missing_is_parse_error() {
        let err = extract_json("no structured output here").unwrap_err();
        assert!(matches!(err, PlanError::Parse(_)));
    }

    #[test]
    fn test_parse_canonical_shape() {
        let parsed = parse_planner_response(
            r#"{"modules": [{"targetModuleId": "flight", "apiCall": {"id": "flights/search", "params": {"from": "Beijing"}}, "reason": "trip"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.modules.len(), 1);
        assert_eq!(parsed.modules[0].target_module_id, "flight");
    }

    #[test]
    fn test_parse_legacy_single_module_shape() {
        let parsed = parse_planner_response(
            r#"{"targetModuleId": "flight", "parameters": {"from": "Beijing"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.modules.len(), 1);
        assert!(parsed.modules[0].parameters.is_some());
    }

    #[test]
    fn test_parse_unknown_shape_is_validation_error() {
        let err = parse_planner_response(r#"{"plan": "nope"}"#).unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn test_convert_preserves_count_and_invariants() {
        let entries: Vec<PlannerEntry> = serde_json::from_str(
            r#"[
                {"targetModuleId": "flight", "apiCall": {"id": "flights/search", "params": {}}},
                {"targetModuleId": "hotel", "apiCall": {"id": "hotels/search", "params": {}}},
                {"targetModuleId": "yelp", "apiCall": {"id": "yelps/search", "params": {}}}
            ]"#,
        )
        .unwrap();
        let candidates = vec![
            summary_with_apis("flight"),
            summary_with_apis("hotel"),
            summary_with_apis("yelp"),
        ];

        let configs = convert_entries(entries, &candidates);
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[0].priority, 1);
        assert!(configs[0].default_expanded);
        assert!(!configs[1].default_expanded);
        assert!(!configs[2].default_expanded);

        let ids: HashSet<&String> = configs.iter().map(|c| &c.instance_id).collect();
        assert_eq!(ids.len(), 3, "instance ids must be pairwise distinct");
    }

    #[test]
    fn test_convert_resolves_endpoint_from_catalog() {
        let entries: Vec<PlannerEntry> = serde_json::from_str(
            r#"[{"targetModuleId": "flight", "apiCall": {"id": "flights/search", "params": {"date": "2026-08-27"}}}]"#,
        )
        .unwrap();
        let configs = convert_entries(entries, &[summary_with_apis("flight")]);

        assert_eq!(configs[0].initial_api.endpoint, "/api/flights/search");
        assert_eq!(
            configs[0].initial_api.parameters.get("date").unwrap(),
            "2026-08-27"
        );
        // The catalog declares a detail op, so item clicks are wired up.
        assert!(configs[0].interaction_apis.contains_key("onItemClick"));
    }

    #[test]
    fn test_convert_ignores_model_layout() {
        let entries: Vec<PlannerEntry> = serde_json::from_str(
            r#"[{"targetModuleId": "info_card", "targetLayout": "map-view-horizontal"}]"#,
        )
        .unwrap();
        let configs = convert_entries(entries, &[]);
        assert_eq!(configs[0].style.layout, Layout::InfoDisplay);
    }

    #[test]
    fn test_layout_lookup_is_fixed() {
        assert_eq!(layout_for_module("flight"), Layout::ScrollableList);
        assert_eq!(layout_for_module("info_card"), Layout::InfoDisplay);
        assert_eq!(layout_for_module("general_agent"), Layout::InteractiveAction);
        assert_eq!(layout_for_module("meeting_view"), Layout::MapView);
        assert_eq!(layout_for_module("anything_else"), Layout::ScrollableList);
    }

    #[test]
    fn test_fallback_plan_shape() {
        let plan = PlanInterpreter::fallback_plan("what is the meaning of life");
        assert_eq!(plan.modules.len(), 1);

        let module = &plan.modules[0];
        assert_eq!(module.module_id, FALLBACK_MODULE_ID);
        assert_eq!(module.priority, 1);
        assert!(module.default_expanded);
        assert_eq!(module.initial_api.api_id, KNOWLEDGE_OP_ID);
        assert_eq!(
            module.initial_api.parameters.get("query").unwrap(),
            "what is the meaning of life"
        );
    }
}
