//! Module catalog
//!
//! Read-only store of module summaries and full definitions backed by a JSON
//! registry directory: `all-modules.json` holds the summaries, `<id>.json`
//! holds each full definition. Definitions are loaded through a process-wide
//! cache and treated as immutable once loaded; a duplicate concurrent
//! first-time load is benign because both readers produce the same value.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::model::{ModuleDefinition, ModuleSummary};

/// Registry file shape: either a bare array or `{ "modules": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryFile {
    Wrapped { modules: Vec<ModuleSummary> },
    Bare(Vec<ModuleSummary>),
}

pub struct ModuleCatalog {
    registry_dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<ModuleDefinition>>>,
}

impl ModuleCatalog {
    pub fn new(registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load every module summary from the registry. An unreadable registry
    /// yields an error; planning on an empty catalog is handled upstream via
    /// the fallback plan.
    pub async fn load_all_summaries(&self) -> Result<Vec<ModuleSummary>> {
        let path = self.registry_dir.join("all-modules.json");
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read module registry at {}", path.display()))?;

        let file: SummaryFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse module registry at {}", path.display()))?;

        let summaries = match file {
            SummaryFile::Wrapped { modules } => modules,
            SummaryFile::Bare(modules) => modules,
        };

        tracing::debug!("Loaded {} module summaries", summaries.len());
        Ok(summaries)
    }

    /// Load one full definition through the cache. A missing or malformed
    /// definition file is per-module recoverable and returns `None`.
    pub async fn definition(&self, module_id: &str) -> Option<Arc<ModuleDefinition>> {
        if let Some(def) = self.cache.read().await.get(module_id) {
            return Some(Arc::clone(def));
        }

        let path = self.registry_dir.join(format!("{}.json", module_id));
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Module definition {} not readable: {}", module_id, e);
                return None;
            }
        };

        let def: ModuleDefinition = match serde_json::from_str(&content) {
            Ok(def) => def,
            Err(e) => {
                tracing::warn!("Module definition {} failed to parse: {}", module_id, e);
                return None;
            }
        };

        let def = Arc::new(def);
        self.cache
            .write()
            .await
            .insert(module_id.to_string(), Arc::clone(&def));
        Some(def)
    }

    /// Batch load; ids with no loadable definition are simply absent from the
    /// result map.
    pub async fn definitions(&self, ids: &[String]) -> HashMap<String, Arc<ModuleDefinition>> {
        let mut out = HashMap::new();
        for id in ids {
            if let Some(def) = self.definition(id).await {
                out.insert(id.clone(), def);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_registry(dir: &std::path::Path) {
        let all = serde_json::json!({
            "modules": [{
                "id": "flight",
                "name": "Flight Search",
                "description": "Search flights",
                "keywords": ["flight"],
                "recommendedLayout": "horizontal-scrollable-list"
            }]
        });
        let mut f = std::fs::File::create(dir.join("all-modules.json")).unwrap();
        f.write_all(all.to_string().as_bytes()).unwrap();

        let def = serde_json::json!({
            "id": "flight",
            "name": "Flight Search",
            "description": "Search flights",
            "keywords": ["flight"],
            "recommendedLayout": "horizontal-scrollable-list",
            "apis": {
                "search": {
                    "id": "flights/search",
                    "endpoint": "/api/flights/search",
                    "method": "POST"
                }
            }
        });
        let mut f = std::fs::File::create(dir.join("flight.json")).unwrap();
        f.write_all(def.to_string().as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_summaries_and_cached_definition() {
        let dir = tempfile::tempdir().unwrap();
        write_registry(dir.path());

        let catalog = ModuleCatalog::new(dir.path());
        let summaries = catalog.load_all_summaries().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "flight");

        let def = catalog.definition("flight").await.unwrap();
        assert_eq!(def.identity.id, "flight");
        assert!(def.apis.contains_key("search"));

        // Second load comes from the cache and yields the same value.
        let again = catalog.definition("flight").await.unwrap();
        assert!(Arc::ptr_eq(&def, &again));
    }

    #[tokio::test]
    async fn test_missing_definition_is_none() {
        let dir = tempfile::tempdir().unwrap();
        write_registry(dir.path());

        let catalog = ModuleCatalog::new(dir.path());
        assert!(catalog.definition("hotel").await.is_none());

        let defs = catalog
            .definitions(&["flight".to_string(), "hotel".to_string()])
            .await;
        assert_eq!(defs.len(), 1);
        assert!(defs.contains_key("flight"));
    }
}
