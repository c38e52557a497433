//! Administrative endpoints

use crate::db::admin;
use crate::db::teams;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

/// Header carrying the shared admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// POST /api/admin/clear
///
/// Destructive wipe of every table, FK-safe order. Gated by the shared
/// secret; an empty configured secret disables the gate.
pub async fn clear_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    check_admin_secret(&state, &headers)?;

    let counts = admin::clear_all(&state.db).await?;
    Ok(Json(json!({
        "status": "success",
        "deleted": counts,
    })))
}

/// GET /api/statistics
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let stats = admin::get_statistics(&state.db).await?;
    Ok(Json(json!({
        "status": "success",
        "statistics": stats,
    })))
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let team_count = teams::count_teams(&state.db).await?;
    Ok(Json(json!({
        "status": "running",
        "teams": team_count,
        "timestamp": fieldday_common::time::now_ms(),
    })))
}

fn check_admin_secret(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    // Empty secret disables the gate (development convention)
    if state.admin_secret.is_empty() {
        return Ok(());
    }

    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if provided == state.admin_secret {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("admin secret mismatch".to_string()))
    }
}
