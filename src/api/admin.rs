//! Admin API endpoints
//!
//! Editor:
//! - GET /api/v1/admin/dashboard - Headline counters
//!
//! Admin:
//! - GET /api/v1/admin/users - List users
//! - PUT /api/v1/admin/users/{id}/role - Change role
//! - PUT /api/v1/admin/users/{id}/ban - Ban or unban

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::common::{PageResponse, PaginationQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{DashboardStats, UserRole};

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub banned: bool,
}

pub fn editor_router() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(dashboard))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/role", put(set_role))
        .route("/admin/users/{id}/ban", put(set_banned))
}

/// GET /api/v1/admin/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.analytics_service.dashboard_stats().await?))
}

/// GET /api/v1/admin/users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    let result = state.user_service.list(&query.params()).await?;
    Ok(Json(result.map(UserResponse::from).into()))
}

/// PUT /api/v1/admin/users/{id}/role
async fn set_role(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role: UserRole = body
        .role
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Invalid role: {}", body.role)))?;

    let user = state.user_service.set_role(&admin.0, id, role).await?;
    tracing::info!(admin_id = admin.0.id, user_id = id, role = %role, "User role changed");
    Ok(Json(user.into()))
}

/// PUT /api/v1/admin/users/{id}/ban
async fn set_banned(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<BanRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .set_banned(&admin.0, id, body.banned)
        .await?;
    tracing::info!(admin_id = admin.0.id, user_id = id, banned = body.banned, "User ban updated");
    Ok(Json(user.into()))
}
