use serde::Serialize;
use sqlx::FromRow;

use crate::repo::Entity;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // never exposed in JSON
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["id", "username", "email", "hashed_password"];
    const OWNER_COLUMN: Option<&'static str> = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_never_leaks_the_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@x.com".into(),
            hashed_password: "$argon2id$secret".into(),
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(json.contains("alice@x.com"));
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("argon2id"));
    }
}
