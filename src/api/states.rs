//! State API endpoints
//!
//! - GET /api/v1/states - All states, by name
//! - GET /api/v1/states/{slug}
//! - POST /api/v1/admin/states (admin)
//! - PUT, DELETE /api/v1/admin/states/{id} (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::categories::CreateCategoryRequest;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Region, UpdateCategoryInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/states", get(list_states))
        .route("/states/{slug}", get(get_state))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/states", post(create_state))
        .route("/admin/states/{id}", put(update_state).delete(delete_state))
}

async fn list_states(State(state): State<AppState>) -> Result<Json<Vec<Region>>, ApiError> {
    Ok(Json(state.region_service.list().await?))
}

async fn get_state(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Region>, ApiError> {
    Ok(Json(state.region_service.get_by_slug(&slug).await?))
}

async fn create_state(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Region>), ApiError> {
    let region = state.region_service.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

async fn update_state(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryInput>,
) -> Result<Json<Region>, ApiError> {
    Ok(Json(state.region_service.update(id, body).await?))
}

async fn delete_state(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.region_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
