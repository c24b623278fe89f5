//! Analytics API endpoints
//!
//! - GET /api/v1/admin/analytics - View report (editor)

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::models::AnalyticsSummary;

pub fn editor_router() -> Router<AppState> {
    Router::new().route("/admin/analytics", get(summary))
}

/// GET /api/v1/admin/analytics
///
/// Total and today's views, views per weekday over the last seven days and
/// the most read articles.
async fn summary(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>, ApiError> {
    Ok(Json(state.analytics_service.summary().await?))
}
