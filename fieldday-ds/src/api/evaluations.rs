//! Teacher evaluation endpoints

use crate::engine::{evaluation, roster};
use crate::error::ApiResult;
use crate::models::wire::SaveEvaluationRequest;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Query parameters for the paged evaluation roster.
#[derive(Debug, Deserialize)]
pub struct EvaluationTeamsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size", alias = "pageSize")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    5
}

/// GET /api/team/:team_id/evaluation
///
/// Reconciled stage map; empty when no evaluation exists yet.
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let stage_map = evaluation::get_evaluation(&state.db, &team_id).await?;
    Ok(Json(json!({
        "status": "success",
        "evaluation": stage_map,
    })))
}

/// POST /api/team/:team_id/evaluation
///
/// Saves the generation-2 stage map plus the display-name lookup row.
pub async fn save_evaluation(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<SaveEvaluationRequest>,
) -> ApiResult<Json<Value>> {
    evaluation::save_evaluation(
        &state.db,
        &team_id,
        &request.team_name,
        &request.evaluations,
    )
    .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "evaluation stored",
    })))
}

/// GET /api/evaluation/teams?page=&page_size=
pub async fn evaluation_teams(
    State(state): State<AppState>,
    Query(query): Query<EvaluationTeamsQuery>,
) -> ApiResult<Json<Value>> {
    let (teams, pagination) =
        roster::evaluable_teams(&state.db, query.page, query.page_size).await?;
    Ok(Json(json!({
        "status": "success",
        "teams": teams,
        "pagination": pagination,
    })))
}
