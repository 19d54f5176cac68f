use async_trait::async_trait;

/// A text-generation backend.
///
/// `Ok(None)` means the model produced nothing usable. That is an expected
/// outcome and callers answer from the static library instead. `Err` is
/// reserved for transport failures (connection refused, timeout, bad status).
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<Option<String>>;

    fn name(&self) -> &str;
}

/// Trim generated text and map blank output to `None`.
pub fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}
