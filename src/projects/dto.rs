use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::projects::repo::Project;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update: absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_supports_partial_patches() {
        let patch: UpdateProjectRequest = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert!(patch.name.is_none());
        assert_eq!(patch.description.as_deref(), Some("x"));

        let empty: UpdateProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.name.is_none());
        assert!(empty.description.is_none());
    }

    #[test]
    fn project_response_serialization() {
        let response = ProjectResponse {
            id: 9,
            name: "Apollo".into(),
            description: None,
            owner_id: 2,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["owner_id"], 2);
        assert_eq!(json["description"], serde_json::Value::Null);
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }
}
