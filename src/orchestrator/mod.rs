//! Plan and data-call execution

pub mod api_executor;
pub mod plan_executor;

pub use api_executor::ApiExecutor;
pub use plan_executor::PlanExecutor;
