//! Article API endpoints
//!
//! Public:
//! - GET /api/v1/articles - Published articles, filtered and paginated
//! - GET /api/v1/articles/{slug} - A published article
//! - POST /api/v1/articles/{slug}/view - Record a view
//!
//! Editor:
//! - GET /api/v1/admin/articles - Any article, filtered and paginated
//! - POST /api/v1/admin/articles - Create article
//! - GET /api/v1/admin/articles/{id} - Get article by ID
//! - PUT /api/v1/admin/articles/{id} - Update article
//! - DELETE /api/v1/admin/articles/{id} - Delete article

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{default_page, default_per_page, deserialize_some, PageResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    Article, ArticleFilter, ArticleStatus, CreateArticleInput, EventTarget, ListParams,
    UpdateArticleInput,
};

/// Query parameters for the public listing
#[derive(Debug, Deserialize)]
pub struct PublicArticlesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Category slug
    pub category: Option<String>,
    /// State slug
    pub state: Option<String>,
    /// Search over title and summary
    pub q: Option<String>,
}

/// Query parameters for the desk listing
#[derive(Debug, Deserialize)]
pub struct AdminArticlesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub status: Option<String>,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
    pub breaking: Option<bool>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// Request body for creating an article
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub slug: String,
    pub summary: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub category_id: Option<i64>,
    pub state_id: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

/// Request body for updating an article
#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub featured_image_url: Option<String>,
    pub status: Option<String>,
    pub is_breaking: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub state_id: Option<Option<i64>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

/// Parse a status string, rejecting unknown values
pub(crate) fn parse_status(status: Option<&str>) -> Result<Option<ArticleStatus>, ApiError> {
    match status {
        None => Ok(None),
        Some(s) => ArticleStatus::from_str(s)
            .map(Some)
            .ok_or_else(|| ApiError::validation_error(format!("Invalid article status: {}", s))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Public article routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_published))
        .route("/articles/{slug}", get(get_published))
        .route("/articles/{slug}/view", post(record_view))
}

/// Desk article routes (editor)
pub fn editor_router() -> Router<AppState> {
    Router::new()
        .route("/admin/articles", get(list_articles).post(create_article))
        .route(
            "/admin/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
}

/// GET /api/v1/articles
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<PublicArticlesQuery>,
) -> Result<Json<PageResponse<Article>>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let filter = ArticleFilter {
        category_slug: non_blank(query.category),
        state_slug: non_blank(query.state),
        search: non_blank(query.q),
        ..Default::default()
    };

    let result = state.article_service.list_published(filter, &params).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/articles/{slug}
///
/// Drafts and archived stories are reported as missing.
async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let article = state.article_service.get_published_by_slug(&slug).await?;
    Ok(Json(article))
}

/// POST /api/v1/articles/{slug}/view
async fn record_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    let article = state.article_service.get_published_by_slug(&slug).await?;
    state
        .analytics_service
        .record_view(EventTarget::Article(article.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/articles
async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<AdminArticlesQuery>,
) -> Result<Json<PageResponse<Article>>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let filter = ArticleFilter {
        status: parse_status(query.status.as_deref())?,
        category_id: query.category_id,
        state_id: query.state_id,
        is_breaking: query.breaking,
        is_featured: query.featured,
        search: non_blank(query.search),
        ..Default::default()
    };

    let result = state.article_service.list(&filter, &params).await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/admin/articles
async fn create_article(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let status = parse_status(body.status.as_deref())?.unwrap_or_default();

    let input = CreateArticleInput {
        summary: body.summary,
        featured_image_url: body.featured_image_url,
        status,
        is_breaking: body.is_breaking,
        is_featured: body.is_featured,
        category_id: body.category_id,
        state_id: body.state_id,
        meta_title: body.meta_title,
        meta_description: body.meta_description,
        meta_keywords: body.meta_keywords,
        ..CreateArticleInput::new(body.title, body.slug, body.content, user.0.id)
    };

    let article = state.article_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// GET /api/v1/admin/articles/{id}
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.article_service.get_by_id(id).await?))
}

/// PUT /api/v1/admin/articles/{id}
async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateArticleRequest>,
) -> Result<Json<Article>, ApiError> {
    let input = UpdateArticleInput {
        title: body.title,
        slug: body.slug,
        summary: body.summary,
        content: body.content,
        featured_image_url: body.featured_image_url,
        status: parse_status(body.status.as_deref())?,
        is_breaking: body.is_breaking,
        is_featured: body.is_featured,
        category_id: body.category_id,
        state_id: body.state_id,
        meta_title: body.meta_title,
        meta_description: body.meta_description,
        meta_keywords: body.meta_keywords,
    };

    Ok(Json(state.article_service.update(id, input).await?))
}

/// DELETE /api/v1/admin/articles/{id}
async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
