use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    repo::{Repo, SqlValue},
    resumes::repo_types::Resume,
};

/// Pre/post content pair to be logged when an update records history.
/// Present only when history was requested and the field set carries both
/// the new `content` and the `original_content` it replaces.
fn history_payload(
    fields: &[(&'static str, SqlValue)],
    record_history: bool,
) -> Option<(String, String)> {
    if !record_history {
        return None;
    }
    let original = text_field(fields, "original_content")?;
    let improved = text_field(fields, "content")?;
    Some((original.to_string(), improved.to_string()))
}

fn text_field<'f>(fields: &'f [(&'static str, SqlValue)], name: &str) -> Option<&'f str> {
    fields.iter().find_map(|(column, value)| match value {
        SqlValue::Text(text) if *column == name => Some(text.as_str()),
        _ => None,
    })
}

/// Ownership-scoped resume update. With `record_history`, the revision-log
/// insert and the content update run in one transaction; if the update
/// matches no row the whole transaction rolls back, so no orphan history
/// entry can persist.
pub async fn update_owned(
    repo: &Repo<Resume>,
    id: i64,
    mut fields: Vec<(&'static str, SqlValue)>,
    owner_id: i64,
    record_history: bool,
) -> AppResult<Option<Resume>> {
    let Some((original, improved)) = history_payload(&fields, record_history) else {
        return repo.update(id, &fields, Some(owner_id)).await;
    };

    debug!(resume_id = id, "logging improved content");
    // original_content is not a column on resumes.
    fields.retain(|(column, _)| *column != "original_content");

    let mut tx = repo.pool().begin().await?;
    sqlx::query(
        "INSERT INTO resume_history (resume_id, original_content, improved_content) \
         VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(&original)
    .bind(&improved)
    .execute(&mut *tx)
    .await?;

    let mut qb = Repo::<Resume>::update_builder(id, &fields, Some(owner_id))?;
    let updated = qb
        .build_query_as::<Resume>()
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from_sqlx)?;

    match updated {
        Some(resume) => {
            tx.commit().await?;
            Ok(Some(resume))
        }
        None => {
            tx.rollback().await?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn improve_fields() -> Vec<(&'static str, SqlValue)> {
        vec![
            ("content", SqlValue::Text("better text".into())),
            ("original_content", SqlValue::Text("plain text".into())),
        ]
    }

    #[test]
    fn history_requires_explicit_opt_in() {
        assert_eq!(history_payload(&improve_fields(), false), None);
    }

    #[test]
    fn history_captures_pre_and_post_content() {
        let payload = history_payload(&improve_fields(), true);
        assert_eq!(
            payload,
            Some(("plain text".to_string(), "better text".to_string()))
        );
    }

    #[test]
    fn history_needs_both_content_fields() {
        let only_content = vec![("content", SqlValue::Text("better text".into()))];
        assert_eq!(history_payload(&only_content, true), None);

        let only_original = vec![("original_content", SqlValue::Text("plain".into()))];
        assert_eq!(history_payload(&only_original, true), None);
    }
}
