//! Submission endpoint

use crate::engine;
use crate::error::ApiResult;
use crate::models::wire::SubmissionDoc;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// POST /api/submit
///
/// Accepts the full nested wire document; only the team identity block is
/// required. Returns the derived team identifier.
pub async fn submit(
    State(state): State<AppState>,
    Json(doc): Json<SubmissionDoc>,
) -> ApiResult<Json<Value>> {
    let team_id = engine::submit::submit_document(&state.db, &doc).await?;

    // Audit snapshot; failure never fails the accepted submission
    if let Err(e) = state.snapshots.save(&team_id, &doc) {
        warn!(team_id = %team_id, error = %e, "Failed to write submission snapshot");
    }

    info!(team_id = %team_id, "Received submission");
    Ok(Json(json!({
        "status": "success",
        "teamId": team_id,
        "message": "submission stored",
    })))
}
