//! User model
//!
//! Defines the User entity and role types. The email address is the login
//! identity; the role drives every permission check in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique, used to log in)
    pub email: String,
    /// Display name
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Profile image path
    pub avatar: Option<String>,
    /// Notification preferences
    pub preferences: NotificationPreferences,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User. The password must already be hashed
    /// (`services::password::hash_password`).
    pub fn new(email: String, username: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by the database
            email,
            username,
            password_hash,
            role,
            avatar: None,
            preferences: NotificationPreferences::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// User role for authorization.
///
/// - Admin: moderates artworks, manages events/projects and roles
/// - Member: submits artworks and project contributions
/// - Visitor: read access only beyond their own contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Member,
    Visitor,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Visitor
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Member => write!(f, "member"),
            UserRole::Visitor => write!(f, "visitor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "member" => Ok(UserRole::Member),
            "visitor" => Ok(UserRole::Visitor),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Per-user notification preference flags.
///
/// Stored and served so clients can filter what they display; fan-out
/// itself always delivers to every affected user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub artwork: bool,
    pub events: bool,
    pub projects: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            artwork: true,
            events: true,
            projects: true,
        }
    }
}

/// Input for a profile update (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Plaintext password (will be hashed)
    pub password: Option<String>,
    pub avatar: Option<String>,
}
