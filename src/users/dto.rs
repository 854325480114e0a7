use serde::{Deserialize, Serialize};

use crate::repo::{non_blank, SqlValue};
use crate::users::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for self-update; blank fields are pruned before the update
/// statement is built.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(username) = non_blank(self.username) {
            fields.push(("username", SqlValue::Text(username)));
        }
        if let Some(email) = non_blank(self.email) {
            fields.push(("email", SqlValue::Text(email)));
        }
        fields
    }
}

/// Form body for POST /login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenOut {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_pruned() {
        let payload = UserUpdate {
            username: Some("   ".into()),
            email: Some(String::new()),
        };
        assert!(payload.into_fields().is_empty());
    }

    #[test]
    fn present_fields_survive_pruning() {
        let payload = UserUpdate {
            username: Some("alice2".into()),
            email: None,
        };
        let fields = payload.into_fields();
        assert_eq!(fields, vec![("username", SqlValue::Text("alice2".into()))]);
    }
}
