use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::projects::dto::ProjectPatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub github_url: String,
    pub status: ProjectStatus,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Project {
    pub async fn list_by_owner(
        db: &PgPool,
        user_id: i64,
        limit: i64,
        skip: i64,
    ) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, github_url, status, user_id, created_at
            FROM projects
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        user_id: i64,
        name: &str,
        github_url: &str,
    ) -> anyhow::Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, github_url, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, github_url, status, user_id, created_at
            "#,
        )
        .bind(name)
        .bind(github_url)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(project)
    }

    /// Fetch scoped by `(id, user_id)`: a project that exists but belongs to
    /// someone else looks exactly like a missing one.
    pub async fn find_by_owner(
        db: &PgPool,
        user_id: i64,
        project_id: i64,
    ) -> anyhow::Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, github_url, status, user_id, created_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(project)
    }

    /// Apply a partial update; absent patch fields leave the column as-is.
    pub async fn update(
        db: &PgPool,
        user_id: i64,
        project_id: i64,
        patch: &ProjectPatch,
    ) -> anyhow::Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($3, name),
                status = COALESCE($4, status)
            WHERE id = $1 AND user_id = $2
            RETURNING id, name, github_url, status, user_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(patch.name.as_deref())
        .bind(patch.status)
        .fetch_optional(db)
        .await?;
        Ok(project)
    }

    /// Returns whether a row was deleted; deployments follow via cascade.
    pub async fn delete(db: &PgPool, user_id: i64, project_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
