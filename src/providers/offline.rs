use super::traits::Provider;
use async_trait::async_trait;

/// Provider that never generates anything, so every turn is answered from the
/// static advice library. Useful without a local model daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

#[async_trait]
impl Provider for OfflineProvider {
    async fn generate(&self, _model: &str, _prompt: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
