use serde::Deserialize;

use crate::repo::{non_blank, SqlValue};

/// Request body for resume creation. The title is required and non-empty;
/// content is optional free text.
#[derive(Debug, Deserialize)]
pub struct ResumeCreate {
    pub title: String,
    pub content: Option<String>,
}

/// Request body for resume update; blank fields are pruned before the
/// update statement is built.
#[derive(Debug, Default, Deserialize)]
pub struct ResumeUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ResumeUpdate {
    pub fn into_fields(self) -> Vec<(&'static str, SqlValue)> {
        let mut fields = Vec::new();
        if let Some(title) = non_blank(self.title) {
            fields.push(("title", SqlValue::Text(title)));
        }
        if let Some(content) = non_blank(self.content) {
            fields.push(("content", SqlValue::Text(content)));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_blank_fields_prune_to_nothing() {
        let payload = ResumeUpdate {
            title: Some("  \n".into()),
            content: Some(String::new()),
        };
        assert!(payload.into_fields().is_empty());
    }

    #[test]
    fn mixed_payload_keeps_only_meaningful_fields() {
        let payload = ResumeUpdate {
            title: None,
            content: Some("Experienced engineer".into()),
        };
        assert_eq!(
            payload.into_fields(),
            vec![("content", SqlValue::Text("Experienced engineer".into()))]
        );
    }
}
