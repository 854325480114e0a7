use serde::Serialize;
use sqlx::FromRow;

use crate::repo::Entity;

/// Resume record in the database. Ownership is immutable after creation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resume {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub owner_id: i64,
}

impl Entity for Resume {
    const TABLE: &'static str = "resumes";
    const COLUMNS: &'static [&'static str] = &["id", "title", "content", "owner_id"];
    const OWNER_COLUMN: Option<&'static str> = Some("owner_id");
}
