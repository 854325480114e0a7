use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    Form, Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        CurrentUser,
    },
    error::{AppError, AppResult},
    repo::SqlValue,
    state::AppState,
    users::dto::{LoginForm, Pagination, TokenOut, UserCreate, UserOut, UserUpdate},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn conflict_message(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict("Username or email already registered".into()),
        other => other,
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserOut>)> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::validation("Username must be non empty"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        return Err(AppError::validation("Password too short"));
    }

    let hashed = hash_password(&payload.password)?;
    let user = state
        .users
        .create(&[
            ("username", SqlValue::Text(username)),
            ("email", SqlValue::Text(email)),
            ("hashed_password", SqlValue::Text(hashed)),
        ])
        .await
        .map_err(conflict_message)?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserOut>> {
    let user = state
        .users
        .find_one(&[("id", SqlValue::Int(user_id))])
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<UserOut>>> {
    let users = state.users.find(&[], page.skip, page.limit).await?;
    Ok(Json(users.into_iter().map(UserOut::from).collect()))
}

#[instrument(skip(state, current, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserOut>> {
    // Self-update only, checked before any database call.
    if current.id != user_id {
        warn!(acting = current.id, target = user_id, "user update forbidden");
        return Err(AppError::Forbidden);
    }

    let fields = payload.into_fields();
    if fields.is_empty() {
        return Err(AppError::NoOpUpdate);
    }

    let updated = state
        .users
        .update(user_id, &fields, None)
        .await
        .map_err(conflict_message)?
        .ok_or(AppError::NotFound("User"))?;

    info!(user_id, "user updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, current))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    if current.id != user_id {
        warn!(acting = current.id, target = user_id, "user delete forbidden");
        return Err(AppError::Forbidden);
    }

    state
        .users
        .delete(user_id, None)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    info!(user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenOut>> {
    let user = state
        .users
        .find_one(&[("username", SqlValue::Text(form.username.clone()))])
        .await?;

    let authenticated = match &user {
        Some(user) => verify_password(&form.password, &user.hashed_password)?,
        None => false,
    };
    let Some(user) = user.filter(|_| authenticated) else {
        warn!(username = %form.username, "login failed");
        return Err(AppError::Unauthenticated("Incorrect username or password"));
    };

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenOut::bearer(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+tag@sub.example.org"));
    }

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a b@x.com"));
    }
}
