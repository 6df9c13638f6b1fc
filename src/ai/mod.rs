//! Request interpretation
//!
//! Turns free text into an execution plan: heuristic retrieval shortlists
//! catalog modules, the Planner model stage selects modules and parameters,
//! and the Mapper model stage later reshapes fetched data per layout.

pub mod interpreter;
pub mod prompts;
pub mod retriever;

pub use interpreter::{layout_for_module, PlanInterpreter, FALLBACK_MODULE_ID};
pub use retriever::Retriever;
