use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::auth::{
    dto::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    extractors::CurrentUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Maps a unique-violation from the insert to the same 400 the
/// read-then-write check produces, closing the registration race.
fn conflict_from_db(e: &sqlx::Error) -> Option<ApiError> {
    let db_err = e.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    let message = match db_err.constraint() {
        Some("users_email_key") => "Email already registered",
        _ => "Username already registered",
    };
    Some(ApiError::conflict(message))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::validation("Invalid email"));
        }
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    // Ensure username is not taken. Case-sensitive exact match; the schema
    // constraint catches the remaining race window.
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::conflict("Username already registered"));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(
        &state.db,
        &payload.username,
        payload.email.as_deref(),
        payload.full_name.as_deref(),
        payload.role,
        &hash,
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            if let Some(conflict) = conflict_from_db(&e) {
                warn!(username = %payload.username, "duplicate registration lost the race");
                return Err(conflict);
            }
            error!(error = %e, "create user failed");
            return Err(anyhow::Error::from(e).into());
        }
    };

    info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    // Unknown username and wrong password must be indistinguishable.
    let user = match User::find_by_username(&state.db, &payload.username).await? {
        Some(user) => user,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(ApiError::unauthorized("Incorrect username or password"));
        }
    };

    if !verify_password(&payload.password, &user.hashed_password) {
        warn!(username = %payload.username, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Incorrect username or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
        user: UserResponse::from(user),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserResponse>> {
    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn token_response_serialization() {
        use crate::auth::repo_types::Role;
        use time::OffsetDateTime;

        let response = TokenResponse {
            access_token: "abc.def.ghi".into(),
            token_type: "bearer".into(),
            user: UserResponse {
                id: 1,
                username: "alice".into(),
                email: None,
                full_name: None,
                role: Role::User,
                is_active: true,
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "abc.def.ghi");
        assert_eq!(json["user"]["username"], "alice");
    }
}
