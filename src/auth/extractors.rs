use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::jwt::JwtKeys,
    error::AppError,
    repo::SqlValue,
    state::AppState,
    users::repo_types::User,
};

/// Resolves the bearer credential into the acting user. Invoked before any
/// business logic on every protected request; a token for a deleted user is
/// rejected exactly like a forged one.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthenticated("Invalid Authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthenticated("Could not validate credentials")
        })?;

        let user_id = claims
            .user_id()
            .ok_or(AppError::Unauthenticated("Could not validate credentials"))?;

        let user = state
            .users
            .find_one(&[("id", SqlValue::Int(user_id))])
            .await?
            .ok_or(AppError::Unauthenticated("Could not validate credentials"))?;

        Ok(CurrentUser(user))
    }
}
