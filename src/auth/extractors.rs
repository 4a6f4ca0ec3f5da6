use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the authenticated principal for a request: bearer token ->
/// verified claims -> user row -> active check. Resolved fresh on every
/// call; nothing is cached across requests.
///
/// A bad signature, a malformed or expired token, a non-numeric subject and
/// an unknown user id all produce the same 401, so responses cannot be used
/// to probe which accounts exist.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::invalid_credentials)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(ApiError::invalid_credentials)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::invalid_credentials()
        })?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::invalid_credentials())?;

        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id, "token subject has no matching user");
                ApiError::invalid_credentials()
            })?;

        if !user.is_active {
            return Err(ApiError::InactiveUser);
        }

        Ok(CurrentUser(user))
    }
}
