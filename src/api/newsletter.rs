//! Newsletter API endpoints
//!
//! - POST /api/v1/newsletter/subscribe
//! - POST /api/v1/newsletter/unsubscribe
//! - GET /api/v1/admin/newsletter - Subscriber list (admin)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{default_page, default_per_page, PageResponse};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{ListParams, NewsletterSubscription};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// true: subscribed, false: unsubscribed, absent: everyone
    pub active: Option<bool>,
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/newsletter/subscribe", post(subscribe))
        .route("/newsletter/unsubscribe", post(unsubscribe))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/admin/newsletter", get(list_subscribers))
}

/// POST /api/v1/newsletter/subscribe
async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<NewsletterSubscription>), ApiError> {
    let subscription = state
        .newsletter_service
        .subscribe(&body.email, body.name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// POST /api/v1/newsletter/unsubscribe
async fn unsubscribe(
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    state.newsletter_service.unsubscribe(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/newsletter
async fn list_subscribers(
    State(state): State<AppState>,
    Query(query): Query<SubscribersQuery>,
) -> Result<Json<PageResponse<NewsletterSubscription>>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let result = state
        .newsletter_service
        .list(query.active, &params)
        .await?;
    Ok(Json(result.into()))
}
