//! Video API endpoints
//!
//! Public:
//! - GET /api/v1/videos - Latest videos
//! - GET /api/v1/videos/{id}
//! - POST /api/v1/videos/{id}/view - Record a view
//!
//! Editor:
//! - GET, POST /api/v1/admin/videos
//! - GET, PUT, DELETE /api/v1/admin/videos/{id}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{deserialize_some, PageResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateVideoInput, EventTarget, UpdateVideoInput, Video, VideoType};
use crate::services::video::LATEST_VIDEOS;

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub video_type: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub state_id: Option<Option<i64>>,
}

fn parse_video_type(value: Option<&str>) -> Result<Option<VideoType>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => VideoType::from_str(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation_error(format!("Invalid video type: {}", s))),
    }
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/videos", get(latest_videos))
        .route("/videos/{id}", get(get_video))
        .route("/videos/{id}/view", post(record_view))
}

pub fn editor_router() -> Router<AppState> {
    Router::new()
        .route("/admin/videos", get(list_videos).post(create_video))
        .route(
            "/admin/videos/{id}",
            get(get_video).put(update_video).delete(delete_video),
        )
}

/// GET /api/v1/videos
async fn latest_videos(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let limit = query.limit.unwrap_or(LATEST_VIDEOS).clamp(1, 50);
    Ok(Json(state.video_service.latest(limit).await?))
}

async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Video>, ApiError> {
    Ok(Json(state.video_service.get_by_id(id).await?))
}

/// POST /api/v1/videos/{id}/view
async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let video = state.video_service.get_by_id(id).await?;
    state
        .analytics_service
        .record_view(EventTarget::Video(video.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/videos
async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PageResponse<Video>>, ApiError> {
    let result = state.video_service.list(&query.params()).await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/admin/videos
async fn create_video(
    State(state): State<AppState>,
    Json(body): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let input = CreateVideoInput {
        title: body.title,
        description: body.description,
        video_url: body.video_url,
        video_type: parse_video_type(body.video_type.as_deref())?.unwrap_or_default(),
        thumbnail_url: body.thumbnail_url,
        category_id: body.category_id,
        state_id: body.state_id,
    };
    let video = state.video_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(video)))
}

/// PUT /api/v1/admin/videos/{id}
async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateVideoRequest>,
) -> Result<Json<Video>, ApiError> {
    let input = UpdateVideoInput {
        title: body.title,
        description: body.description,
        video_url: body.video_url,
        video_type: parse_video_type(body.video_type.as_deref())?,
        thumbnail_url: body.thumbnail_url,
        category_id: body.category_id,
        state_id: body.state_id,
    };
    Ok(Json(state.video_service.update(id, input).await?))
}

/// DELETE /api/v1/admin/videos/{id}
async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.video_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_type() {
        assert_eq!(parse_video_type(None).unwrap(), None);
        assert_eq!(
            parse_video_type(Some("facebook")).unwrap(),
            Some(VideoType::Facebook)
        );
        assert!(parse_video_type(Some("vimeo")).is_err());
    }
}
