//! Workflow definition endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::dto::{WorkflowDetailDto, WorkflowSummaryDto};
use crate::error::ApiError;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkflowSummaryDto>>, ApiError> {
    let workflows = state
        .definitions
        .list()
        .iter()
        .map(|definition| WorkflowSummaryDto::from(definition.as_ref()))
        .collect();
    Ok(Json(workflows))
}

pub async fn get(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<WorkflowDetailDto>, ApiError> {
    let definition = state.definitions.load(&id)?;
    Ok(Json(WorkflowDetailDto::from(definition.as_ref())))
}
