use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::CurrentUser,
    deployments::repo::Deployment,
    error::ApiError,
    extract::Json,
    projects::dto::{CreateProjectRequest, Pagination, ProjectDetails, ProjectPatch},
    projects::repo::Project,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project))
        .route("/projects/:id", put(update_project))
        .route("/projects/:id", delete(delete_project))
}

#[instrument(skip(state, user))]
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ProjectDetails>>, ApiError> {
    p.validate()?;
    let projects = Project::list_by_owner(&state.db, user.id, p.limit, p.skip).await?;

    // Deployments are embedded through one explicit query over the page,
    // then grouped back onto their projects.
    let ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
    let mut deployments = Deployment::list_for_projects(&state.db, &ids).await?;

    let items = projects
        .into_iter()
        .map(|project| {
            let own: Vec<Deployment> = deployments
                .iter()
                .filter(|d| d.project_id == project.id)
                .cloned()
                .collect();
            deployments.retain(|d| d.project_id != project.id);
            ProjectDetails::new(project, own)
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, user, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDetails>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name: must not be empty".into()));
    }
    if payload.github_url.trim().is_empty() {
        return Err(ApiError::Validation("github_url: must not be empty".into()));
    }

    let project = Project::create(&state.db, user.id, &payload.name, &payload.github_url).await?;
    info!(user_id = user.id, project_id = project.id, "project created");
    Ok((
        StatusCode::CREATED,
        Json(ProjectDetails::new(project, Vec::new())),
    ))
}

#[instrument(skip(state, user))]
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetails>, ApiError> {
    let project = Project::find_by_owner(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    let deployments = Deployment::list_for_projects(&state.db, &[project.id]).await?;
    Ok(Json(ProjectDetails::new(project, deployments)))
}

#[instrument(skip(state, user, patch))]
pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectDetails>, ApiError> {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name: must not be empty".into()));
        }
    }

    let project = Project::update(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    let deployments = Deployment::list_for_projects(&state.db, &[project.id]).await?;
    info!(user_id = user.id, project_id = project.id, "project updated");
    Ok(Json(ProjectDetails::new(project, deployments)))
}

#[instrument(skip(state, user))]
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !Project::delete(&state.db, user.id, id).await? {
        return Err(ApiError::NotFound("Project not found".into()));
    }
    info!(user_id = user.id, project_id = id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
