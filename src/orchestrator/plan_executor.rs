//! Plan execution
//!
//! Walks an execution plan's modules strictly in plan order. The sequential
//! loop is deliberate: it bounds concurrent model calls from the Mapper stage
//! and keeps traces deterministic. Every per-module failure is contained so
//! one bad module never takes down the plan: a missing definition or failed
//! fetch skips that module, and a Mapper failure downgrades to raw data.

use std::sync::Arc;

use serde_json::Value;

use crate::ai::PlanInterpreter;
use crate::catalog::ModuleCatalog;
use crate::model::{ExecutionPlan, ModuleInstance};

use super::api_executor::ApiExecutor;

pub struct PlanExecutor {
    catalog: Arc<ModuleCatalog>,
    api_executor: Arc<ApiExecutor>,
    interpreter: Arc<PlanInterpreter>,
}

impl PlanExecutor {
    pub fn new(
        catalog: Arc<ModuleCatalog>,
        api_executor: Arc<ApiExecutor>,
        interpreter: Arc<PlanInterpreter>,
    ) -> Self {
        Self {
            catalog,
            api_executor,
            interpreter,
        }
    }

    /// Fetch, map, and assemble every module in the plan, returning the
    /// instances sorted ascending by priority.
    pub async fn execute(&self, plan: &ExecutionPlan) -> Vec<ModuleInstance> {
        tracing::info!("Executing plan with {} modules", plan.modules.len());

        let module_ids: Vec<String> = plan.modules.iter().map(|m| m.module_id.clone()).collect();
        let definitions = self.catalog.definitions(&module_ids).await;

        let mut instances = Vec::with_capacity(plan.modules.len());

        for config in &plan.modules {
            let Some(definition) = definitions.get(&config.module_id) else {
                tracing::warn!("Skipping {}: no module definition", config.module_id);
                continue;
            };

            tracing::debug!(
                "Module {}: calling {}",
                config.module_id,
                config.initial_api.api_id
            );
            let response = self.api_executor.execute(&config.initial_api).await;

            let raw_data = match response.data {
                Some(data) if response.success => data,
                _ => {
                    tracing::warn!(
                        "Skipping {}: data call {} failed: {}",
                        config.module_id,
                        config.initial_api.api_id,
                        response.error.unwrap_or_default()
                    );
                    continue;
                }
            };

            // Mapper degrades to the raw data internally; this never fails.
            let data: Value = self
                .interpreter
                .map_to_ui(&raw_data, config.style.layout)
                .await;

            instances.push(ModuleInstance::assemble(
                config,
                data,
                definition.as_ref().clone(),
            ));
        }

        // Authoritative render order, regardless of processing order or
        // partial failures. Stable sort keeps plan order for equal priority.
        instances.sort_by_key(|i| i.priority);

        tracing::info!("Plan execution produced {} instances", instances.len());
        instances
    }

    /// Acknowledge a user interaction against a rendered instance.
    ///
    /// Placeholder: no real dispatch happens yet. A full implementation would
    /// resolve the instance's interaction call table and run the named call
    /// through the data-fetch layer.
    pub async fn execute_interaction(
        &self,
        instance_id: &str,
        action: &str,
        _context: &serde_json::Map<String, Value>,
    ) -> Value {
        tracing::info!("Interaction {} on {} (acknowledge-only)", action, instance_id);
        serde_json::json!({
            "success": true,
            "message": "Interaction acknowledged",
        })
    }
}
