//! Breaking news desk
//!
//! - GET /api/v1/breaking - Public ticker
//! - GET /api/v1/admin/breaking - All breaking stories, any status
//! - POST /api/v1/admin/breaking - Quick-create a breaking story
//! - POST /api/v1/admin/articles/{id}/toggle-breaking
//! - POST /api/v1/admin/articles/{id}/toggle-featured
//! - POST /api/v1/admin/articles/{id}/toggle-publish

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::articles::parse_status;
use crate::api::common::{PageResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Article, ArticleFilter};

/// Request body for a quick breaking story
#[derive(Debug, Deserialize)]
pub struct BreakingRequest {
    pub title: String,
    pub content: String,
    /// Defaults to published
    pub status: Option<String>,
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/breaking", get(ticker))
}

pub fn editor_router() -> Router<AppState> {
    Router::new()
        .route("/admin/breaking", get(list_breaking).post(create_breaking))
        .route("/admin/articles/{id}/toggle-breaking", post(toggle_breaking))
        .route("/admin/articles/{id}/toggle-featured", post(toggle_featured))
        .route("/admin/articles/{id}/toggle-publish", post(toggle_publish))
}

/// GET /api/v1/breaking
async fn ticker(State(state): State<AppState>) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.article_service.breaking_ticker().await?))
}

/// GET /api/v1/admin/breaking
async fn list_breaking(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PageResponse<Article>>, ApiError> {
    let filter = ArticleFilter::default().breaking();
    let result = state.article_service.list(&filter, &query.params()).await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/admin/breaking
async fn create_breaking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<BreakingRequest>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let status = parse_status(body.status.as_deref())?;
    let article = state
        .article_service
        .create_breaking(user.0.id, body.title, body.content, status)
        .await?;
    tracing::info!(article_id = article.id, "Breaking story filed");
    Ok((StatusCode::CREATED, Json(article)))
}

async fn toggle_breaking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.toggle_breaking(id).await?))
}

async fn toggle_featured(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.toggle_featured(id).await?))
}

async fn toggle_publish(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.toggle_publish(id).await?))
}
