//! Event API endpoints
//!
//! Event writes are admin-gated inside the service; every update
//! response carries the fan-out report so the caller can see whether all
//! attendees were notified.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::PagedResponse;
use crate::models::{CreateEventInput, Event, EventFilter, ListParams, UpdateEventInput};
use crate::services::FanoutReport;

/// Query parameters for event listing
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListEventsQuery {
    fn filter(&self) -> EventFilter {
        EventFilter {
            date: self.date,
            location: self.location.clone(),
            search: self.search.clone(),
        }
    }

    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(10))
    }
}

/// Response for an event update, including notification delivery
#[derive(Debug, Serialize)]
pub struct EventUpdateResponse {
    #[serde(flatten)]
    pub event: Event,
    pub notifications: FanoutReport,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/my", get(my_events))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/attendees", get(event_attendees))
}

/// GET /api/events
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<PagedResponse<Event>>, ApiError> {
    let page = state
        .event_service
        .list(&query.filter(), &query.params())
        .await?;
    Ok(Json(PagedResponse::new(page)))
}

/// POST /api/events
async fn create_event(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateEventInput>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.event_service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/my
async fn my_events(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.event_service.my_events(&user).await?))
}

/// GET /api/events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.event_service.get(id).await?))
}

/// GET /api/events/{id}/attendees
async fn event_attendees(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(state.event_service.attendees(id).await?))
}

/// PUT /api/events/{id}
async fn update_event(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateEventInput>,
) -> Result<Json<EventUpdateResponse>, ApiError> {
    let (event, notifications) = state.event_service.update(&user, id, input).await?;
    Ok(Json(EventUpdateResponse {
        event,
        notifications,
    }))
}

/// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.event_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/event-stats
pub async fn event_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.event_service.stats().await?))
}
