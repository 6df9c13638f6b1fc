//! Planning error taxonomy
//!
//! Empty retrieval and mapper failures never reach this type (both recover
//! locally); what remains is a malformed planner response or a failed model
//! call, and callers need to tell those apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// No JSON span was found in the planner response, or the span did not
    /// parse.
    #[error("Failed to parse planner response: {0}")]
    Parse(String),

    /// The planner response parsed but did not match the expected shape.
    #[error("Planner response failed validation: {0}")]
    Validation(String),

    /// The model call itself failed (network, timeout, empty content).
    #[error("Model request failed: {0}")]
    Model(#[from] anyhow::Error),
}
