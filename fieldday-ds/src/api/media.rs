//! Media file upload/download endpoints
//!
//! Raw bytes in and out; the metadata rows travel in the submission document
//! and may precede the upload.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// POST /api/team/:team_id/media/:filename
pub async fn upload_media(
    State(state): State<AppState>,
    Path((team_id, filename)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload body".to_string()));
    }

    let stored = state.media.save_file(&team_id, &filename, &body)?;
    Ok(Json(json!({
        "status": "success",
        "path": stored.display().to_string(),
        "size": body.len(),
    })))
}

/// GET /api/team/:team_id/media/:filename
pub async fn download_media(
    State(state): State<AppState>,
    Path((team_id, filename)): Path<(String, String)>,
) -> ApiResult<Response> {
    let path = state.media.resolve(&team_id, &filename)?;
    if !path.exists() {
        return Err(ApiError::NotFound(format!("media file {}", filename)));
    }

    let bytes = tokio::fs::read(&path).await?;
    let content_type = content_type_for(&filename);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".mp4") {
        "video/mp4"
    } else {
        "application/octet-stream"
    }
}
