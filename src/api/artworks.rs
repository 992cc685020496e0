//! Artwork API endpoints
//!
//! Submission, browsing, and the moderation actions. Moderation lives
//! under PATCH verbs so approving twice stays an idempotent request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::PagedResponse;
use crate::models::{
    ApprovalStatus, Artwork, ArtworkFilter, CreateArtworkInput, ListParams, UpdateArtworkInput,
};

/// Query parameters for artwork listing
#[derive(Debug, Deserialize)]
pub struct ListArtworksQuery {
    pub approval_status: Option<String>,
    pub artist: Option<i64>,
    pub search: Option<String>,
    /// "oldest" flips the default newest-first ordering
    pub order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListArtworksQuery {
    fn filter(&self) -> Result<ArtworkFilter, ApiError> {
        let approval_status = match self.approval_status.as_deref() {
            Some(s) => Some(
                s.parse::<ApprovalStatus>()
                    .map_err(|e| ApiError::validation_error(e.to_string()))?,
            ),
            None => None,
        };
        Ok(ArtworkFilter {
            approval_status,
            artist_id: self.artist,
            search: self.search.clone(),
            newest_first: self.order.as_deref() != Some("oldest"),
        })
    }

    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(10))
    }
}

/// Body for the reject action
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub feedback: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_artworks).post(create_artwork))
        .route("/my", get(my_artworks))
        .route("/category-analytics", get(category_analytics))
        .route(
            "/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/{id}/approve", patch(approve_artwork))
        .route("/{id}/reject", patch(reject_artwork))
}

/// GET /api/artworks
async fn list_artworks(
    State(state): State<AppState>,
    Query(query): Query<ListArtworksQuery>,
) -> Result<Json<PagedResponse<Artwork>>, ApiError> {
    let page = state
        .artwork_service
        .list(&query.filter()?, &query.params())
        .await?;
    Ok(Json(PagedResponse::new(page)))
}

/// POST /api/artworks
async fn create_artwork(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateArtworkInput>,
) -> Result<impl IntoResponse, ApiError> {
    let artwork = state.artwork_service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(artwork)))
}

/// GET /api/artworks/my
async fn my_artworks(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<ListArtworksQuery>,
) -> Result<Json<PagedResponse<Artwork>>, ApiError> {
    let page = state
        .artwork_service
        .my_artworks(&user, &query.params())
        .await?;
    Ok(Json(PagedResponse::new(page)))
}

/// GET /api/artworks/category-analytics
async fn category_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let analytics = state.artwork_service.category_analytics().await?;
    Ok(Json(analytics))
}

/// GET /api/artworks/{id}
async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Artwork>, ApiError> {
    Ok(Json(state.artwork_service.get(id).await?))
}

/// PUT /api/artworks/{id}
async fn update_artwork(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateArtworkInput>,
) -> Result<Json<Artwork>, ApiError> {
    Ok(Json(state.artwork_service.update(&user, id, input).await?))
}

/// DELETE /api/artworks/{id}
async fn delete_artwork(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.artwork_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/artworks/{id}/approve
async fn approve_artwork(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<Artwork>, ApiError> {
    Ok(Json(state.artwork_service.approve(&user, id).await?))
}

/// PATCH /api/artworks/{id}/reject
async fn reject_artwork(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<Artwork>, ApiError> {
    Ok(Json(
        state
            .artwork_service
            .reject(&user, id, &body.feedback)
            .await?,
    ))
}
