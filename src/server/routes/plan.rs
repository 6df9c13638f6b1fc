//! Plan generation and interaction endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::server::state::AppState;
use crate::server::types::{
    ErrorResponse, ExecuteInteractionRequest, ExecuteInteractionResponse, GeneratePlanRequest,
    GeneratePlanResponse,
};

/// POST /api/ai/generate-plan
///
/// Full pipeline: load summaries, interpret the request into a plan, execute
/// the plan, return the assembled instances. An empty catalog or unmatched
/// input still succeeds via the fallback plan; only model or planner-output
/// failures surface as errors.
pub async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeneratePlanRequest>,
) -> Result<Json<GeneratePlanResponse>, (StatusCode, Json<ErrorResponse>)> {
    tracing::info!("Plan request: {:?}", request.user_input);

    let summaries = state.catalog.load_all_summaries().await.unwrap_or_else(|e| {
        tracing::warn!("Catalog unavailable, planning against empty set: {}", e);
        Vec::new()
    });

    let plan = state
        .interpreter
        .generate_plan(&request.user_input, request.context.as_ref(), &summaries)
        .await
        .map_err(|e| {
            tracing::error!("Plan generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;

    let instances = state.plan_executor.execute(&plan).await;
    tracing::info!("Returning {} module instances", instances.len());

    Ok(Json(GeneratePlanResponse {
        success: true,
        global_style: plan.global_style,
        modules: instances,
    }))
}

/// POST /api/ai/execute-interaction
///
/// Placeholder surface: acknowledges the interaction without real dispatch.
pub async fn execute_interaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteInteractionRequest>,
) -> Json<ExecuteInteractionResponse> {
    let data = state
        .plan_executor
        .execute_interaction(&request.instance_id, &request.action, &request.context)
        .await;

    Json(ExecuteInteractionResponse {
        success: true,
        data,
    })
}
