use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    repo::SqlValue,
    resumes::{
        dto::{ResumeCreate, ResumeUpdate},
        repo::update_owned,
        repo_types::Resume,
    },
    state::AppState,
    users::dto::Pagination,
};

#[instrument(skip(state, current, payload))]
pub async fn create_resume(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<ResumeCreate>,
) -> AppResult<(StatusCode, Json<Resume>)> {
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("Title must be non empty"));
    }

    let content = match payload.content {
        Some(content) => SqlValue::Text(content),
        None => SqlValue::Null,
    };
    let resume = state
        .resumes
        .create(&[
            ("title", SqlValue::Text(payload.title)),
            ("content", content),
            ("owner_id", SqlValue::Int(current.id)),
        ])
        .await?;

    info!(resume_id = resume.id, owner_id = current.id, "resume created");
    Ok((StatusCode::CREATED, Json(resume)))
}

#[instrument(skip(state, current))]
pub async fn get_resume(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(resume_id): Path<i64>,
) -> AppResult<Json<Resume>> {
    let resume = state
        .resumes
        .find_one(&[
            ("id", SqlValue::Int(resume_id)),
            ("owner_id", SqlValue::Int(current.id)),
        ])
        .await?
        .ok_or(AppError::NotFound("Resume"))?;
    Ok(Json(resume))
}

#[instrument(skip(state, current))]
pub async fn list_resumes(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Resume>>> {
    let resumes = state
        .resumes
        .find(
            &[("owner_id", SqlValue::Int(current.id))],
            page.skip,
            page.limit,
        )
        .await?;
    Ok(Json(resumes))
}

#[instrument(skip(state, current, payload))]
pub async fn update_resume(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(resume_id): Path<i64>,
    Json(payload): Json<ResumeUpdate>,
) -> AppResult<Json<Resume>> {
    let fields = payload.into_fields();
    if fields.is_empty() {
        return Err(AppError::NoOpUpdate);
    }

    let updated = update_owned(&state.resumes, resume_id, fields, current.id, false)
        .await?
        .ok_or(AppError::NotFound("Resume"))?;

    info!(resume_id, "resume updated");
    Ok(Json(updated))
}

#[instrument(skip(state, current))]
pub async fn delete_resume(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(resume_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .resumes
        .delete(resume_id, Some(current.id))
        .await?
        .ok_or(AppError::NotFound("Resume"))?;

    info!(resume_id, "resume deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current))]
pub async fn improve_resume(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(resume_id): Path<i64>,
) -> AppResult<Json<Resume>> {
    let resume = state
        .resumes
        .find_one(&[
            ("id", SqlValue::Int(resume_id)),
            ("owner_id", SqlValue::Int(current.id)),
        ])
        .await?
        .ok_or(AppError::NotFound("Resume"))?;

    let original = resume.content.ok_or(AppError::NotFound("Content"))?;
    let improved = state.improver.improve(&original).await?;

    let fields = vec![
        ("content", SqlValue::Text(improved)),
        ("original_content", SqlValue::Text(original)),
    ];
    let updated = update_owned(&state.resumes, resume_id, fields, current.id, true)
        .await?
        .ok_or(AppError::NotFound("Resume"))?;

    info!(resume_id, "resume content improved");
    Ok(Json(updated))
}
