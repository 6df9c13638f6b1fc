//! Data-fetch execution
//!
//! Resolves a module's declared data call. In mock mode the operation id maps
//! to a JSON template on disk whose string leaves carry `${params.KEY}`
//! placeholders; real mode is not implemented yet and silently delegates to
//! the mock path (known limitation). The reserved `general/ask` operation
//! bypasses templates and asks the language model directly.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::prompts;
use crate::config::DataMode;
use crate::llm::ChatClient;
use crate::model::{ApiCallConfig, ApiResponse, KNOWLEDGE_OP_ID};

/// Simulated latency when a mock document declares none.
const DEFAULT_MOCK_DELAY_MS: u64 = 300;

/// Parameter keys probed, in order, for the knowledge-lookup query text.
const QUERY_KEYS: &[&str] = &["query", "q", "text", "question"];

const DEFAULT_QUERY: &str = "Tell me something interesting";

/// On-disk mock template: optional latency plus the response body.
#[derive(Debug, Deserialize)]
struct MockDocument {
    #[serde(default)]
    delay: Option<u64>,
    response: Value,
}

pub struct ApiExecutor {
    mode: DataMode,
    mock_dir: PathBuf,
    client: Arc<dyn ChatClient>,
}

impl ApiExecutor {
    pub fn new(mode: DataMode, mock_dir: impl Into<PathBuf>, client: Arc<dyn ChatClient>) -> Self {
        Self {
            mode,
            mock_dir: mock_dir.into(),
            client,
        }
    }

    /// Execute one data call. Failures come back as structured error
    /// responses, never as panics or transport errors.
    pub async fn execute(&self, call: &ApiCallConfig) -> ApiResponse {
        tracing::debug!("Executing data call: {}", call.api_id);

        if call.api_id == KNOWLEDGE_OP_ID {
            return self.knowledge_lookup(call).await;
        }

        match self.mode {
            DataMode::Mock => self.execute_mock(call).await,
            DataMode::Real => self.execute_real(call).await,
        }
    }

    /// Execute all calls concurrently; each call succeeds or fails on its
    /// own, with no ordering guarantee or cross-call cancellation.
    pub async fn execute_batch(
        &self,
        calls: &[ApiCallConfig],
    ) -> HashMap<String, ApiResponse> {
        let futures = calls.iter().map(|call| async {
            let response = self.execute(call).await;
            (call.api_id.clone(), response)
        });

        join_all(futures).await.into_iter().collect()
    }

    async fn execute_mock(&self, call: &ApiCallConfig) -> ApiResponse {
        let path = self.mock_resource_path(&call.api_id);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(_) => {
                tracing::warn!("Mock resource missing for {}", call.api_id);
                return ApiResponse::error(format!(
                    "Mock resource not found: {}",
                    path.display()
                ));
            }
        };

        let document: MockDocument = match serde_json::from_str(&content) {
            Ok(doc) => doc,
            Err(e) => {
                return ApiResponse::error(format!(
                    "Mock resource {} is malformed: {}",
                    path.display(),
                    e
                ))
            }
        };

        tokio::time::sleep(Duration::from_millis(
            document.delay.unwrap_or(DEFAULT_MOCK_DELAY_MS),
        ))
        .await;

        ApiResponse::ok(substitute_params(&document.response, &call.parameters))
    }

    /// Live-endpoint execution is not implemented; it delegates to the mock
    /// path so callers still get data. Known limitation.
    async fn execute_real(&self, call: &ApiCallConfig) -> ApiResponse {
        tracing::warn!(
            "Real data mode requested for {} but is not implemented; using mock data",
            call.api_id
        );
        self.execute_mock(call).await
    }

    /// Answer a free-text question directly via the model and shape the reply
    /// as a single info-display item.
    async fn knowledge_lookup(&self, call: &ApiCallConfig) -> ApiResponse {
        let query = extract_query(&call.parameters);
        let messages = prompts::assistant_messages(&query);

        match self.client.send(&messages).await {
            Ok(answer) => ApiResponse::ok(json!([{
                "title": query,
                "summary": answer,
                "metadata": [],
            }])),
            Err(e) => ApiResponse::error(format!("Knowledge lookup failed: {}", e)),
        }
    }

    /// `flights/search` -> `<mock_dir>/flights-search.json`
    fn mock_resource_path(&self, api_id: &str) -> PathBuf {
        self.mock_dir.join(format!("{}.json", api_id.replace('/', "-")))
    }
}

/// Pick the query text: first populated well-known key, else the first
/// parameter value (by sorted key, for determinism), else a fixed default.
/// Non-string values stringify the same way on both paths.
fn extract_query(parameters: &HashMap<String, Value>) -> String {
    for key in QUERY_KEYS {
        if let Some(value) = parameters.get(*key).filter(|v| !v.is_null()) {
            let text = stringify(value);
            if !text.is_empty() {
                return text;
            }
        }
    }

    let mut keys: Vec<&String> = parameters.keys().collect();
    keys.sort_unstable();
    if let Some(first) = keys.first() {
        return stringify(&parameters[*first]);
    }

    DEFAULT_QUERY.to_string()
}

/// Recursively replace `${params.KEY}` tokens in every string leaf.
fn substitute_params(template: &Value, parameters: &HashMap<String, Value>) -> Value {
    match template {
        Value::String(s) => {
            let mut out = s.clone();
            for (key, value) in parameters {
                let token = format!("${{params.{}}}", key);
                if out.contains(&token) {
                    out = out.replace(&token, &stringify(value));
                }
            }
            Value::String(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_params(item, parameters))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_params(v, parameters)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
