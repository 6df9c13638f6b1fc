//! Shared server state

use std::sync::Arc;

use crate::ai::PlanInterpreter;
use crate::catalog::ModuleCatalog;
use crate::config::Config;
use crate::llm;
use crate::orchestrator::{ApiExecutor, PlanExecutor};

/// Everything a request handler needs. Built once at startup; all contained
/// components are request-scoped in their behavior except the catalog's
/// definition cache, which only ever grows with immutable values.
pub struct AppState {
    pub catalog: Arc<ModuleCatalog>,
    pub interpreter: Arc<PlanInterpreter>,
    pub plan_executor: PlanExecutor,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = llm::create_client(&config.llm)?;
        let catalog = Arc::new(ModuleCatalog::new(config.catalog.registry_dir.clone()));

        let interpreter = Arc::new(PlanInterpreter::new(
            Arc::clone(&client),
            Arc::clone(&catalog),
            config.catalog.top_k,
        ));

        let api_executor = Arc::new(ApiExecutor::new(
            config.data.mode,
            config.data.mock_dir.clone(),
            client,
        ));

        let plan_executor = PlanExecutor::new(
            Arc::clone(&catalog),
            api_executor,
            Arc::clone(&interpreter),
        );

        Ok(Self {
            catalog,
            interpreter,
            plan_executor,
        })
    }
}
