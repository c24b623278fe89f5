//! API layer - HTTP handlers and routing
//!
//! Every route lives under `/api/v1`:
//! - public reads for the front page, articles, videos, live streams,
//!   categories, states and translations, plus newsletter signup and login
//! - editor routes under `/admin` for the CMS screens
//! - admin-only routes for users, categories, states and subscribers

pub mod admin;
pub mod analytics;
pub mod articles;
pub mod auth;
pub mod breaking;
pub mod categories;
pub mod common;
pub mod home;
pub mod i18n;
pub mod live;
pub mod middleware;
pub mod newsletter;
pub mod states;
pub mod videos;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the `/api/v1` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .merge(admin::admin_router())
        .merge(categories::admin_router())
        .merge(states::admin_router())
        .merge(newsletter::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // CMS routes (need editor or admin)
    let editor_routes = Router::new()
        .merge(articles::editor_router())
        .merge(breaking::editor_router())
        .merge(videos::editor_router())
        .merge(live::editor_router())
        .merge(analytics::editor_router())
        .merge(admin::editor_router())
        .route_layer(axum_middleware::from_fn(middleware::require_editor))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (any signed-in user)
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .merge(home::public_router())
        .merge(articles::public_router())
        .merge(breaking::public_router())
        .merge(videos::public_router())
        .merge(live::public_router())
        .merge(categories::public_router())
        .merge(states::public_router())
        .merge(newsletter::public_router())
        .merge(i18n::public_router())
        .merge(auth::public_router())
        .merge(admin_routes)
        .merge(editor_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    // Cookie auth needs credentials, which rules out a wildcard origin
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state))
}
