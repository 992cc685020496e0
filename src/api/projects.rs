//! Project API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::PagedResponse;
use crate::models::{
    CreateProjectInput, CreateProjectUpdateInput, ListParams, Project, ProjectUpdate,
    UpdateProjectInput,
};
use crate::services::FanoutReport;

/// Query parameters for project listing
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListProjectsQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(10))
    }
}

/// Response for a project update, including invite delivery when the
/// member set was replaced
#[derive(Debug, Serialize)]
pub struct ProjectUpdateResponse {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<FanoutReport>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{id}/complete", post(complete_project))
        .route("/{id}/members", get(project_members))
        .route("/{id}/updates", get(list_updates).post(add_update))
}

/// GET /api/projects
async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<Json<PagedResponse<Project>>, ApiError> {
    let page = state
        .project_service
        .list(query.search.as_deref(), &query.params())
        .await?;
    Ok(Json(PagedResponse::new(page)))
}

/// POST /api/projects
async fn create_project(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateProjectInput>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state.project_service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/{id}
async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.project_service.get(id).await?))
}

/// GET /api/projects/{id}/members
async fn project_members(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(state.project_service.members(id).await?))
}

/// PUT /api/projects/{id}
async fn update_project(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<ProjectUpdateResponse>, ApiError> {
    let (project, notifications) = state.project_service.update(&user, id, input).await?;
    Ok(Json(ProjectUpdateResponse {
        project,
        notifications,
    }))
}

/// POST /api/projects/{id}/complete
async fn complete_project(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.project_service.complete(&user, id).await?))
}

/// DELETE /api/projects/{id}
async fn delete_project(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.project_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/projects/{id}/updates
async fn list_updates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ProjectUpdate>>, ApiError> {
    Ok(Json(state.project_service.list_updates(id).await?))
}

/// POST /api/projects/{id}/updates
async fn add_update(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(input): Json<CreateProjectUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state.project_service.add_update(&user, id, input).await?;
    Ok((StatusCode::CREATED, Json(update)))
}

/// GET /api/project-stats
pub async fn project_stats(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_service.stats(&user).await?))
}
