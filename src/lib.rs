// Library exports for cardflow
// This allows the modules to be imported in tests and external code

pub mod ai;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod orchestrator;
pub mod server;
pub mod utils;
