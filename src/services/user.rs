//! User service
//!
//! Registration, credential login, session lifecycle, profile and
//! preference updates, and role administration. The first registered
//! account becomes the administrator; everyone after that starts as a
//! visitor until an admin promotes them.

use crate::db::repositories::{ActivityLogRepository, SessionRepository, UserRepository};
use crate::models::{
    ActivityAction, ListParams, NotificationPreferences, PagedResult, Session, UpdateProfileInput,
    User, UserRole,
};
use crate::services::password::{hash_password, verify_password};
use crate::services::{permissions, record_activity};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Valid identity, insufficient role
    #[error("{0}")]
    Forbidden(String),

    /// Unknown user id
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Account counts broken down by role
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberStats {
    pub total_users: i64,
    pub admins: i64,
    pub members: i64,
    pub visitors: i64,
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    activity_repo: Arc<dyn ActivityLogRepository>,
    session_expiration_days: i64,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        activity_repo: Arc<dyn ActivityLogRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            activity_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a user service with a custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        activity_repo: Arc<dyn ActivityLogRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            activity_repo,
            session_expiration_days,
        }
    }

    /// Register a new account.
    ///
    /// The very first account in the system is created as an admin so the
    /// instance can be bootstrapped; every later account starts as a
    /// visitor.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

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

        let is_first = self
            .user_repo
            .count()
            .await
            .context("Failed to count users")?
            == 0;
        let role = if is_first {
            UserRole::Admin
        } else {
            UserRole::Visitor
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.email, input.username, password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;
        Ok(created)
    }

    /// Login with email and password.
    ///
    /// The error message never reveals whether the email exists.
    pub async fn login(&self, input: LoginInput) -> Result<(User, Session), UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to get user by email")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid email or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        let session = self.create_session(user.id).await?;
        record_activity(
            self.activity_repo.as_ref(),
            user.id,
            ActivityAction::Login,
            None,
        )
        .await;

        Ok((user, session))
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, caller: &User, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Logout,
            None,
        )
        .await;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are removed on sight and treated as absent.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    /// Update the caller's own profile.
    pub async fn update_profile(
        &self,
        caller: &User,
        input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        let mut user = caller.clone();

        if let Some(username) = input.username {
            if username.trim().is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Username cannot be empty".to_string(),
                ));
            }
            user.username = username;
        }
        if let Some(email) = input.email {
            if !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email format".to_string(),
                ));
            }
            if email != caller.email
                && self
                    .user_repo
                    .get_by_email(&email)
                    .await
                    .context("Failed to check email")?
                    .is_some()
            {
                return Err(UserServiceError::UserExists(format!(
                    "Email '{}' is already registered",
                    email
                )));
            }
            user.email = email;
        }
        if let Some(password) = input.password {
            if password.is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Password cannot be empty".to_string(),
                ));
            }
            user.password_hash =
                hash_password(&password).context("Failed to hash password")?;
        }
        if let Some(avatar) = input.avatar {
            user.avatar = Some(avatar);
        }

        let updated = self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some("profile"),
        )
        .await;
        Ok(updated)
    }

    /// Replace the caller's notification preferences.
    pub async fn update_preferences(
        &self,
        caller: &User,
        preferences: NotificationPreferences,
    ) -> Result<User, UserServiceError> {
        let mut user = caller.clone();
        user.preferences = preferences;
        Ok(self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update preferences")?)
    }

    /// Change another user's role. Admin only.
    pub async fn update_role(
        &self,
        caller: &User,
        user_id: i64,
        role: UserRole,
    ) -> Result<User, UserServiceError> {
        if !permissions::can_manage_users(caller) {
            return Err(UserServiceError::Forbidden(
                "Only admins can change roles".to_string(),
            ));
        }

        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound)?;

        self.user_repo
            .update_role(user.id, role)
            .await
            .context("Failed to update role")?;
        record_activity(
            self.activity_repo.as_ref(),
            caller.id,
            ActivityAction::Update,
            Some(&format!("role of user {} to {}", user.id, role)),
        )
        .await;

        self.user_repo
            .get_by_id(user.id)
            .await
            .context("Failed to reload user")?
            .ok_or(UserServiceError::NotFound)
    }

    /// List all accounts, newest first. Admin only.
    pub async fn list_users(
        &self,
        caller: &User,
        params: &ListParams,
    ) -> Result<PagedResult<User>, UserServiceError> {
        if !permissions::can_manage_users(caller) {
            return Err(UserServiceError::Forbidden(
                "Only admins can list users".to_string(),
            ));
        }
        Ok(self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?)
    }

    /// Account counts by role. Admin only.
    pub async fn member_stats(&self, caller: &User) -> Result<MemberStats, UserServiceError> {
        if !permissions::can_manage_users(caller) {
            return Err(UserServiceError::Forbidden(
                "Only admins can view member stats".to_string(),
            ));
        }

        let counts = self
            .user_repo
            .count_by_role()
            .await
            .context("Failed to count users by role")?;

        let mut stats = MemberStats::default();
        for (role, count) in counts {
            stats.total_users += count;
            match role.as_str() {
                "admin" => stats.admins = count,
                "member" => stats.members = count,
                "visitor" => stats.visitors = count,
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Delete all expired sessions, returning the number removed.
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?)
    }

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };
        Ok(self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?)
    }
}

/// Input for user registration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
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
        }
    }
}

/// Input for user login
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
