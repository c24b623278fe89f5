//! User service
//!
//! Registration, login and sessions for the newsroom, plus the admin-only
//! role and ban management.
//!
//! - The first registered user becomes admin; everyone after that is a reader
//! - Passwords are hashed with argon2 and must be at least 8 characters
//! - A session token is a random uuid stored server side
//! - An admin cannot demote or ban themselves

use crate::db::is_unique_violation;
use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, ListParams, PagedResult, Session, User, UserRole, UserStatus};
use crate::services::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Invalid credentials
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The account is banned
    #[error("Account is banned")]
    Banned,

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User not found: {0}")]
    NotFound(i64),

    /// The action is not allowed for this caller
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl RegisterInput {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_email: username_or_email.into(),
            password: password.into(),
        }
    }
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_days: i64,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_days,
        }
    }

    /// Session lifetime in days
    pub fn session_days(&self) -> i64 {
        self.session_days
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for a blank username, a malformed email or a short password
    /// - `UserExists` when the username or email is taken
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let input = CreateUserInput {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password: input.password,
            full_name: input
                .full_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        };
        validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }
        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        // The insert picks admin or reader; a concurrent sign-up with the
        // same name or email still lands here as a UNIQUE violation
        let user = self
            .user_repo
            .create(&input, &password_hash)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserServiceError::UserExists(
                        "Username or email is already registered".to_string(),
                    )
                } else {
                    UserServiceError::InternalError(e.context("Failed to create user"))
                }
            })?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and open a session.
    ///
    /// Unknown accounts and wrong passwords give the same error.
    pub async fn login(&self, input: LoginInput) -> Result<(User, Session), UserServiceError> {
        let invalid = || UserServiceError::AuthenticationError("Invalid username or password".to_string());

        let user = self
            .find_user_by_username_or_email(input.username_or_email.trim())
            .await?
            .ok_or_else(invalid)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(invalid());
        }
        if user.is_banned() {
            return Err(UserServiceError::Banned);
        }

        let session = self
            .session_repo
            .create(&Session::issue(user.id, self.session_days))
            .await
            .context("Failed to create session")?;

        Ok((user, session))
    }

    /// Invalidate a session token
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens, and tokens of banned users, yield `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let Some(session) = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        else {
            return Ok(None);
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;
        Ok(user.filter(|user| !user.is_banned()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    /// All users, newest first
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let users = self
            .user_repo
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list users")?;
        let total = self.user_repo.count().await.context("Failed to count users")?;
        Ok(PagedResult::new(users, total, params))
    }

    /// Change a user's role. An admin cannot demote themselves.
    pub async fn set_role(
        &self,
        actor: &User,
        user_id: i64,
        role: UserRole,
    ) -> Result<User, UserServiceError> {
        if actor.id == user_id && role != UserRole::Admin {
            return Err(UserServiceError::Forbidden(
                "You cannot change your own role".to_string(),
            ));
        }
        let target = self.require_user(user_id).await?;
        self.update_access(target.id, role, target.status).await
    }

    /// Ban or unban a user. Banning also ends the user's sessions.
    pub async fn set_banned(
        &self,
        actor: &User,
        user_id: i64,
        banned: bool,
    ) -> Result<User, UserServiceError> {
        if actor.id == user_id {
            let message = if banned {
                "You cannot ban yourself"
            } else {
                "You cannot change your own ban status"
            };
            return Err(UserServiceError::Forbidden(message.to_string()));
        }
        let target = self.require_user(user_id).await?;
        let status = if banned {
            UserStatus::Banned
        } else {
            UserStatus::Active
        };
        let updated = self.update_access(target.id, target.role, status).await?;

        if banned {
            self.session_repo
                .delete_by_user(user_id)
                .await
                .context("Failed to end sessions of banned user")?;
        }
        Ok(updated)
    }

    /// Remove expired sessions, returning how many were deleted
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?)
    }

    async fn require_user(&self, id: i64) -> Result<User, UserServiceError> {
        self.get_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))
    }

    async fn update_access(
        &self,
        id: i64,
        role: UserRole,
        status: UserStatus,
    ) -> Result<User, UserServiceError> {
        self.user_repo
            .update_access(id, role, status)
            .await
            .context("Failed to update user")?
            .ok_or(UserServiceError::NotFound(id))
    }

    async fn find_user_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if let Some(user) = self
            .user_repo
            .get_by_username(username_or_email)
            .await
            .context("Failed to get user by username")?
        {
            return Ok(Some(user));
        }
        Ok(self
            .user_repo
            .get_by_email(&username_or_email.to_lowercase())
            .await
            .context("Failed to get user by email")?)
    }
}

fn validate_register_input(input: &CreateUserInput) -> Result<(), UserServiceError> {
    if input.username.is_empty() {
        return Err(UserServiceError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if !super::newsletter::is_valid_email(&input.email) {
        return Err(UserServiceError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }
    if input.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
