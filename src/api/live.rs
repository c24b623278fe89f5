//! Live stream API endpoints
//!
//! - GET /api/v1/live - Streams on air
//! - GET, POST /api/v1/admin/live
//! - GET, PUT, DELETE /api/v1/admin/live/{id}
//! - POST /api/v1/admin/live/{id}/toggle

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateLiveStreamInput, LiveStream, UpdateLiveStreamInput};

#[derive(Debug, Deserialize)]
pub struct CreateLiveStreamRequest {
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/live", get(active_streams))
}

pub fn editor_router() -> Router<AppState> {
    Router::new()
        .route("/admin/live", get(list_streams).post(create_stream))
        .route(
            "/admin/live/{id}",
            get(get_stream).put(update_stream).delete(delete_stream),
        )
        .route("/admin/live/{id}/toggle", post(toggle_stream))
}

/// GET /api/v1/live
async fn active_streams(State(state): State<AppState>) -> Result<Json<Vec<LiveStream>>, ApiError> {
    Ok(Json(state.live_stream_service.list_active().await?))
}

async fn list_streams(State(state): State<AppState>) -> Result<Json<Vec<LiveStream>>, ApiError> {
    Ok(Json(state.live_stream_service.list().await?))
}

async fn create_stream(
    State(state): State<AppState>,
    Json(body): Json<CreateLiveStreamRequest>,
) -> Result<(StatusCode, Json<LiveStream>), ApiError> {
    let input = CreateLiveStreamInput {
        title: body.title,
        description: body.description,
        stream_url: body.stream_url,
        thumbnail_url: body.thumbnail_url,
        is_active: body.is_active,
    };
    let stream = state.live_stream_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(stream)))
}

async fn get_stream(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LiveStream>, ApiError> {
    Ok(Json(state.live_stream_service.get_by_id(id).await?))
}

async fn update_stream(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateLiveStreamInput>,
) -> Result<Json<LiveStream>, ApiError> {
    Ok(Json(state.live_stream_service.update(id, body).await?))
}

async fn delete_stream(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.live_stream_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/live/{id}/toggle
async fn toggle_stream(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LiveStream>, ApiError> {
    Ok(Json(state.live_stream_service.toggle_active(id).await?))
}
