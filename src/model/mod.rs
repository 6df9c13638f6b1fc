//! Core data model
//!
//! Shared types for the catalog, data-fetch, and planning layers. Everything
//! here serializes with camelCase field names to match the wire format the
//! frontend consumes.

pub mod api;
pub mod module;
pub mod plan;
pub mod style;

pub use api::{ApiCallConfig, ApiResponse, HttpMethod, KNOWLEDGE_OP_ID};
pub use module::{ApiDefinition, ApiParameter, ModuleDefinition, ModuleIdentity, ModuleSummary};
pub use plan::{ExecutionModuleConfig, ExecutionPlan, ModuleInstance, RequestContext};
pub use style::{CardStyle, ColorScheme, Density, GlobalStyle, Layout, ModuleStyle, Theme};
