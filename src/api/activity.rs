//! Activity log endpoints (admin only)

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PagedResponse;
use crate::models::{ActivityLog, ListParams};

/// Query parameters for activity log listing
#[derive(Debug, Deserialize)]
pub struct ListActivityQuery {
    /// Restrict to a single user's activity
    pub user: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_activity))
}

/// GET /api/activity-logs
async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ListActivityQuery>,
) -> Result<Json<PagedResponse<ActivityLog>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));
    let page = state
        .activity_repo
        .list(query.user, &params)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list activity logs: {:#}", e);
            ApiError::internal_error("Internal server error")
        })?;
    Ok(Json(PagedResponse::new(page)))
}
