//! Notification API endpoints
//!
//! All routes operate on the caller's own notifications; there is no way
//! to read or mutate someone else's.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::PagedResponse;
use crate::models::{ListParams, Notification};

/// Query parameters for notification listing
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub marked: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", patch(mark_all_read))
        .route("/{id}/read", patch(mark_read))
}

/// GET /api/notifications
async fn list_notifications(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<PagedResponse<Notification>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(10));
    let page = state
        .notification_service
        .list_for(&user, query.unread, &params)
        .await?;
    Ok(Json(PagedResponse::new(page)))
}

/// GET /api/notifications/unread-count
async fn unread_count(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = state.notification_service.unread_count(&user).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// PATCH /api/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(state.notification_service.mark_read(&user, id).await?))
}

/// PATCH /api/notifications/read-all
async fn mark_all_read(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let marked = state.notification_service.mark_all_read(&user).await?;
    Ok(Json(MarkAllReadResponse { marked }))
}
