//! User administration and preference endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PagedResponse, UserResponse};
use crate::models::{ListParams, NotificationPreferences, UserRole};

/// Query parameters for user listing
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Body for a role change
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Admin-gated user routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/member-stats", get(member_stats))
        .route("/{id}/role", patch(update_role))
}

/// Preference routes, available to every authenticated user
pub fn preferences_router() -> Router<AppState> {
    Router::new().route("/", get(get_preferences).put(update_preferences))
}

/// GET /api/users
async fn list_users(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PagedResponse<UserResponse>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(10));
    let page = state.user_service.list_users(&user, &params).await?;
    Ok(Json(PagedResponse::from_users(page)))
}

/// GET /api/users/member-stats
async fn member_stats(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    Ok(Json(state.user_service.member_stats(&user).await?))
}

/// PATCH /api/users/{id}/role
async fn update_role(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.update_role(&user, id, body.role).await?;
    Ok(Json(UserResponse::from(updated)))
}

/// GET /api/preferences
async fn get_preferences(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<NotificationPreferences> {
    Json(user.preferences)
}

/// PUT /api/preferences
async fn update_preferences(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(preferences): Json<NotificationPreferences>,
) -> Result<Json<NotificationPreferences>, ApiError> {
    let updated = state
        .user_service
        .update_preferences(&user, preferences)
        .await?;
    Ok(Json(updated.preferences))
}
