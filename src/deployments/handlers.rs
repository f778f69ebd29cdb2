use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::CurrentUser,
    deployments::dto::LogsResponse,
    deployments::repo::Deployment,
    error::ApiError,
    projects::repo::Project,
    state::AppState,
};

const INITIAL_LOG: &str = "Initializing deployment environment...";
const CANCEL_LOG: &str = "\n[SYSTEM] Deployment cancelled by user.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/deploy", post(trigger_deployment))
        .route("/deployments/:id", get(get_deployment))
        .route("/deployments/:id/logs", get(get_deployment_logs))
        .route("/deployments/:id/cancel", post(cancel_deployment))
}

#[instrument(skip(state, user))]
pub async fn trigger_deployment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(project_id): Path<i64>,
) -> Result<(StatusCode, Json<Deployment>), ApiError> {
    let project = Project::find_by_owner(&state.db, user.id, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;

    let deployment = Deployment::create_building(&state.db, project.id, INITIAL_LOG).await?;
    info!(
        user_id = user.id,
        project_id = project.id,
        deployment_id = deployment.id,
        "deployment triggered"
    );
    Ok((StatusCode::CREATED, Json(deployment)))
}

#[instrument(skip(state, user))]
pub async fn get_deployment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Deployment>, ApiError> {
    let deployment = Deployment::find_by_owner(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deployment not found".into()))?;
    Ok(Json(deployment))
}

#[instrument(skip(state, user))]
pub async fn get_deployment_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<LogsResponse>, ApiError> {
    let deployment = Deployment::find_by_owner(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deployment not found".into()))?;
    Ok(Json(LogsResponse {
        logs: deployment.logs,
    }))
}

#[instrument(skip(state, user))]
pub async fn cancel_deployment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Deployment>, ApiError> {
    let deployment = Deployment::find_by_owner(&state.db, user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deployment not found".into()))?;

    if deployment.status.is_terminal() {
        warn!(
            deployment_id = deployment.id,
            status = ?deployment.status,
            "cancel rejected, deployment already terminal"
        );
        return Err(ApiError::Conflict("Deployment cannot be cancelled".into()));
    }

    let deployment = Deployment::cancel(&state.db, deployment.id, CANCEL_LOG).await?;
    info!(
        user_id = user.id,
        deployment_id = deployment.id,
        "deployment cancelled"
    );
    Ok(Json(deployment))
}
