//! Ollama provider (`/api/generate`, non-streaming).

use super::traits::{non_empty, Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub struct OllamaProvider {
    pub(crate) base_url: String,
    timeout: Duration,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            timeout,
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10).min(timeout))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn generate_url(&self) -> String {
        if self.base_url.ends_with("/api/generate") {
            self.base_url.clone()
        } else {
            format!("{}/api/generate", self.base_url)
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<Option<String>> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("ollama request timed out after {}s", self.timeout.as_secs())
                } else {
                    anyhow::anyhow!("ollama request failed: {e}")
                }
            })?;

        if !response.status().is_success() {
            return Err(super::api_error("ollama", response).await);
        }

        let body: GenerateResponse = response.json().await?;
        Ok(non_empty(body.response.as_deref()))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
