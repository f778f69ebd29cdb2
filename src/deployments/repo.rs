use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Lifecycle: `pending -> building -> {live, failed}`, with `cancelled`
/// reachable from either active state. Nothing in this service advances a
/// deployment out of `building`; only cancel moves it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "deployment_status", rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Building,
    Live,
    Failed,
    Cancelled,
}

impl DeploymentStatus {
    /// Terminal statuses permit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeploymentStatus::Live | DeploymentStatus::Failed | DeploymentStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deployment {
    pub id: i64,
    pub project_id: i64,
    pub status: DeploymentStatus,
    pub logs: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl Deployment {
    /// Insert a freshly triggered deployment. There is no build queue, so
    /// trigger goes straight to `building`.
    pub async fn create_building(
        db: &PgPool,
        project_id: i64,
        initial_log: &str,
    ) -> anyhow::Result<Deployment> {
        let deployment = sqlx::query_as::<_, Deployment>(
            r#"
            INSERT INTO deployments (project_id, status, logs)
            VALUES ($1, 'building', $2)
            RETURNING id, project_id, status, logs, started_at, completed_at
            "#,
        )
        .bind(project_id)
        .bind(initial_log)
        .fetch_one(db)
        .await?;
        Ok(deployment)
    }

    /// Fetch through the parent project's owner; a deployment under someone
    /// else's project is indistinguishable from a missing one.
    pub async fn find_by_owner(
        db: &PgPool,
        user_id: i64,
        deployment_id: i64,
    ) -> anyhow::Result<Option<Deployment>> {
        let deployment = sqlx::query_as::<_, Deployment>(
            r#"
            SELECT d.id, d.project_id, d.status, d.logs, d.started_at, d.completed_at
            FROM deployments d
            JOIN projects p ON p.id = d.project_id
            WHERE d.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(deployment_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(deployment)
    }

    /// All deployments of the given projects, oldest first. Callers have
    /// already ownership-checked the project ids.
    pub async fn list_for_projects(
        db: &PgPool,
        project_ids: &[i64],
    ) -> anyhow::Result<Vec<Deployment>> {
        let rows = sqlx::query_as::<_, Deployment>(
            r#"
            SELECT id, project_id, status, logs, started_at, completed_at
            FROM deployments
            WHERE project_id = ANY($1)
            ORDER BY started_at ASC
            "#,
        )
        .bind(project_ids.to_vec())
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Mark cancelled, append the system log line and stamp `completed_at`.
    /// The caller has already checked the status is not terminal.
    pub async fn cancel(
        db: &PgPool,
        deployment_id: i64,
        log_line: &str,
    ) -> anyhow::Result<Deployment> {
        let deployment = sqlx::query_as::<_, Deployment>(
            r#"
            UPDATE deployments
            SET status = 'cancelled',
                logs = logs || $2,
                completed_at = now()
            WHERE id = $1
            RETURNING id, project_id, status, logs, started_at, completed_at
            "#,
        )
        .bind(deployment_id)
        .bind(log_line)
        .fetch_one(db)
        .await?;
        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_live_failed_cancelled_are_terminal() {
        assert!(!DeploymentStatus::Pending.is_terminal());
        assert!(!DeploymentStatus::Building.is_terminal());
        assert!(DeploymentStatus::Live.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
        assert!(DeploymentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeploymentStatus::Building).unwrap(),
            r#""building""#
        );
        assert_eq!(
            serde_json::to_string(&DeploymentStatus::Cancelled).unwrap(),
            r#""cancelled""#
        );
    }
}
