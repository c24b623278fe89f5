//! Front page endpoint
//!
//! - GET /api/v1/home

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::services::HomePage;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/home", get(home_page))
}

async fn home_page(State(state): State<AppState>) -> Result<Json<HomePage>, ApiError> {
    Ok(Json(state.home_service.home_page().await?))
}
