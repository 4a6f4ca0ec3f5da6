use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::extractors::CurrentUser;
use crate::auth::permissions::Permission;
use crate::auth::repo_types::User;
use crate::error::{ApiError, ApiResult};
use crate::projects::dto::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};
use crate::projects::repo::{self, Project};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/project/projects", get(list_projects))
        .route("/project/projects/:id", get(get_project))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/project/projects", post(create_project))
        .route("/project/projects/:id", put(update_project))
        .route("/project/projects/:id", delete(delete_project))
}

fn project_not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("Project with ID {id} not found"))
}

/// Coarse role capability OR ownership. A plain user holds no UPDATE/DELETE
/// grant but may still mutate projects they own.
fn can_modify(state: &AppState, user: &User, project: &Project, permission: Permission) -> bool {
    state.permissions.has(user.role, permission) || project.owner_id == user.id
}

#[instrument(skip(state, payload, user), fields(user_id = %user.id))]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    if !state.permissions.has(user.role, Permission::Create) {
        warn!(role = %user.role, "project creation denied");
        return Err(ApiError::forbidden("Not enough permissions"));
    }

    let project = repo::create(
        &state.db,
        &payload.name,
        payload.description.as_deref(),
        user.id,
    )
    .await?;

    info!(project_id = %project.id, owner_id = %project.owner_id, "project created");
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = repo::list_all(&state.db).await?;
    Ok(Json(
        projects.into_iter().map(ProjectResponse::from).collect(),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    Ok(Json(ProjectResponse::from(project)))
}

#[instrument(skip(state, payload, user), fields(user_id = %user.id))]
pub async fn update_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;

    if !can_modify(&state, &user, &project, Permission::Update) {
        warn!(project_id = %id, role = %user.role, "project update denied");
        return Err(ApiError::forbidden(
            "Not enough permissions to update this project",
        ));
    }

    let updated = repo::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await?;

    info!(project_id = %id, "project updated");
    Ok(Json(ProjectResponse::from(updated)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let project = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;

    if !can_modify(&state, &user, &project, Permission::Delete) {
        warn!(project_id = %id, role = %user.role, "project delete denied");
        return Err(ApiError::forbidden(
            "Not enough permissions to delete this project",
        ));
    }

    repo::delete(&state.db, id).await?;

    info!(project_id = %id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use time::OffsetDateTime;

    fn make_user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: None,
            full_name: None,
            role,
            is_active: true,
            hashed_password: "hash".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn make_project(owner_id: i64) -> Project {
        Project {
            id: 1,
            name: "Apollo".into(),
            description: None,
            owner_id,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn admin_may_modify_any_project() {
        let state = AppState::fake();
        let admin = make_user(1, Role::Admin);
        let project = make_project(99);
        assert!(can_modify(&state, &admin, &project, Permission::Update));
        assert!(can_modify(&state, &admin, &project, Permission::Delete));
    }

    #[tokio::test]
    async fn owner_may_modify_despite_read_only_role() {
        let state = AppState::fake();
        let owner = make_user(7, Role::User);
        let project = make_project(7);
        assert!(can_modify(&state, &owner, &project, Permission::Update));
        assert!(can_modify(&state, &owner, &project, Permission::Delete));
    }

    #[tokio::test]
    async fn unrelated_user_may_not_modify() {
        let state = AppState::fake();
        let outsider = make_user(8, Role::User);
        let project = make_project(7);
        assert!(!can_modify(&state, &outsider, &project, Permission::Update));
        assert!(!can_modify(&state, &outsider, &project, Permission::Delete));
    }
}
