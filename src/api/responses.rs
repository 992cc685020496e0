//! Shared API response types

use serde::Serialize;

use crate::models::{PagedResult, User};

/// User info returned by auth and admin endpoints. Never includes the
/// password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
    pub avatar: Option<String>,
    pub preferences: crate::models::NotificationPreferences,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role.to_string(),
            avatar: user.avatar,
            preferences: user.preferences,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Paginated list envelope
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn new(result: PagedResult<T>) -> Self {
        let total_pages = result.total_pages();
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

impl PagedResponse<UserResponse> {
    pub fn from_users(result: PagedResult<User>) -> Self {
        let total_pages = result.total_pages();
        Self {
            items: result.items.into_iter().map(UserResponse::from).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// Simple acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
