use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::deployments::repo::Deployment;
use crate::error::ApiError;
use crate::projects::repo::{Project, ProjectStatus};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub github_url: String,
}

/// Partial update: only fields present in the body are applied.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Negative values would reach Postgres as invalid OFFSET/LIMIT.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.skip < 0 {
            return Err(ApiError::Validation("skip: must be non-negative".into()));
        }
        if self.limit < 0 {
            return Err(ApiError::Validation("limit: must be non-negative".into()));
        }
        Ok(())
    }
}

/// Project as returned to the client, with its deployments embedded.
#[derive(Debug, Serialize)]
pub struct ProjectDetails {
    pub id: i64,
    pub name: String,
    pub github_url: String,
    pub status: ProjectStatus,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub deployments: Vec<Deployment>,
}

impl ProjectDetails {
    pub fn new(project: Project, deployments: Vec<Deployment>) -> Self {
        Self {
            id: project.id,
            name: project.name,
            github_url: project.github_url,
            status: project.status,
            user_id: project.user_id,
            created_at: project.created_at,
            deployments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_with_omitted_fields_deserializes_to_none() {
        let patch: ProjectPatch = serde_json::from_str("{}").expect("deserialize");
        assert!(patch.name.is_none());
        assert!(patch.status.is_none());

        let patch: ProjectPatch =
            serde_json::from_str(r#"{"status": "archived"}"#).expect("deserialize");
        assert!(patch.name.is_none());
        assert_eq!(patch.status, Some(ProjectStatus::Archived));
    }

    #[test]
    fn pagination_defaults_match_the_list_contract() {
        let p: Pagination = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 100);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn pagination_rejects_negative_values() {
        let p = Pagination { skip: -1, limit: 10 };
        assert!(matches!(p.validate(), Err(ApiError::Validation(_))));

        let p = Pagination { skip: 0, limit: -5 };
        assert!(matches!(p.validate(), Err(ApiError::Validation(_))));

        let p = Pagination { skip: 0, limit: 0 };
        assert!(p.validate().is_ok());
    }
}
