//! Team roster and document endpoints

use crate::engine::{document, roster};
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// GET /api/teams
///
/// Roster summaries sorted by station number ascending.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let teams = roster::list_teams(&state.db).await?;
    Ok(Json(json!({
        "status": "success",
        "count": teams.len(),
        "teams": teams,
    })))
}

/// GET /api/team/:team_id
///
/// Full nested document for one team, or 404 when the team does not exist.
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let doc = document::get_team_document(&state.db, &team_id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": doc,
    })))
}
