//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - User registration
//! - POST /api/v1/auth/login - User login
//! - POST /api/v1/auth/logout - User logout
//! - GET /api/v1/auth/me - Current user

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    extract_session_token, ApiError, AppState, AuthenticatedUser, ClientIp,
};
use crate::models::{Session, User};
use crate::services::user::{LoginInput, RegisterInput, UserServiceError};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_at: String,
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_current_user))
}

fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue, ApiError> {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age_secs
    );
    HeaderValue::from_str(&cookie).map_err(ApiError::internal)
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    user: User,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&session.id, state.user_service.session_days() * 24 * 60 * 60)?,
    );

    Ok((
        status,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
            expires_at: session.expires_at.to_rfc3339(),
        }),
    ))
}

/// POST /api/v1/auth/register
///
/// The first account becomes the admin; later ones are readers.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let mut input = RegisterInput::new(body.username, body.email, body.password);
    if let Some(full_name) = body.full_name {
        input = input.with_full_name(full_name);
    }

    let user = state.user_service.register(input).await?;
    let (user, session) = state
        .user_service
        .login(LoginInput::new(&user.username, password))
        .await?;

    session_response(&state, StatusCode::CREATED, user, session)
}

/// POST /api/v1/auth/login
///
/// Limited per client IP and per account.
async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let login = body.username_or_email.trim().to_string();

    if let Some(ip) = ip {
        if let Some(retry_after) = state.rate_limiter.ip_retry_after(ip).await {
            tracing::warn!(%ip, "Login IP rate limit exceeded");
            return Err(ApiError::too_many_requests(
                "Too many requests, please try again later",
                retry_after,
            ));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    if let Some(retry_after) = state.rate_limiter.account_retry_after(&login).await {
        tracing::warn!(login = %login, "Login account locked out");
        return Err(ApiError::too_many_requests(
            "Too many failed login attempts, please try again later",
            retry_after,
        ));
    }

    let (user, session) = match state
        .user_service
        .login(LoginInput::new(login.clone(), body.password))
        .await
    {
        Ok(result) => result,
        Err(e) => {
            if matches!(e, UserServiceError::AuthenticationError(_)) {
                state.rate_limiter.record_failed_attempt(&login).await;
            }
            return Err(e.into());
        }
    };

    state.rate_limiter.clear_account(&login).await;
    tracing::info!(user_id = user.id, "User logged in");

    session_response(&state, StatusCode::OK, user, session)
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, session_cookie("", 0)?);
    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me
async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        let value = session_cookie("abc", 604800).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
    }

    #[test]
    fn test_login_request_aliases() {
        let body: LoginRequest =
            serde_json::from_str(r#"{"email": "a@x.in", "password": "secret123"}"#).unwrap();
        assert_eq!(body.username_or_email, "a@x.in");

        let body: LoginRequest =
            serde_json::from_str(r#"{"username": "asha", "password": "secret123"}"#).unwrap();
        assert_eq!(body.username_or_email, "asha");
    }
}
