use axum::async_trait;

/// External content-improvement capability. Best effort; the core performs
/// no retries around it.
#[async_trait]
pub trait ContentImprover: Send + Sync {
    async fn improve(&self, content: &str) -> anyhow::Result<String>;
}

/// Deterministic placeholder used until a real model integration lands.
#[derive(Clone)]
pub struct StubImprover;

#[async_trait]
impl ContentImprover for StubImprover {
    async fn improve(&self, content: &str) -> anyhow::Result<String> {
        Ok(format!("{content} [Improved]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_marks_content_as_improved() {
        let improved = StubImprover
            .improve("Experienced engineer")
            .await
            .expect("stub never fails");
        assert_eq!(improved, "Experienced engineer [Improved]");
    }
}
