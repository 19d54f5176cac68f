//! Provider subsystem for text-generation backends.
//!
//! Each backend implements the [`Provider`] trait defined in [`traits`] and is
//! registered in [`create_provider`] by its canonical string key.

pub mod offline;
pub mod ollama;
pub mod traits;

pub use offline::OfflineProvider;
pub use ollama::OllamaProvider;
pub use traits::Provider;

use std::time::Duration;

const MAX_API_ERROR_CHARS: usize = 200;

const SECRET_PREFIXES: [&str; 3] = ["sk-", "Bearer ", "api_key="];
const REDACTED: &str = "[REDACTED]";

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Scrub secret-like tokens (`sk-...`, `Bearer ...`) from backend error text.
/// Ollama rarely sees keys, but reverse proxies in front of it often do.
pub fn scrub_secret_patterns(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let Some(prefix) = SECRET_PREFIXES.iter().find(|p| rest.starts_with(**p)) else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            continue;
        };

        let after = &rest[prefix.len()..];
        let token_len = after
            .find(|ch: char| !is_secret_char(ch))
            .unwrap_or(after.len());
        if token_len == 0 {
            out.push_str(prefix);
        } else {
            out.push_str(REDACTED);
        }
        rest = &after[token_len..];
    }

    out
}

/// Sanitize backend error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }

    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);

    format!("{}...", &scrubbed[..end])
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}

/// Factory: create the right provider from its config name.
pub fn create_provider(
    name: &str,
    api_url: Option<&str>,
    timeout: Duration,
) -> anyhow::Result<Box<dyn Provider>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ollama" => Ok(Box::new(OllamaProvider::new(api_url, timeout))),
        "offline" | "none" => Ok(Box::new(OfflineProvider)),
        _ => anyhow::bail!(
            "Unknown provider: {name}. Supported providers: ollama, offline."
        ),
    }
}

/// Information about a supported provider for display purposes.
pub struct ProviderInfo {
    /// Canonical name used in config (e.g. `"ollama"`)
    pub name: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
}

pub fn list_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            name: "ollama",
            display_name: "Ollama",
            aliases: &[],
        },
        ProviderInfo {
            name: "offline",
            display_name: "Static library only",
            aliases: &["none"],
        },
    ]
}

/// Whether `name` is a canonical provider name or alias from [`list_providers`].
pub fn is_known_provider(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    list_providers()
        .iter()
        .any(|info| info.name == name || info.aliases.contains(&name.as_str()))
}

/// One-line summary of the supported providers, e.g. for error messages.
pub fn describe_providers() -> String {
    list_providers()
        .iter()
        .map(|info| {
            if info.aliases.is_empty() {
                format!("{} ({})", info.name, info.display_name)
            } else {
                format!(
                    "{} ({}; alias {})",
                    info.name,
                    info.display_name,
                    info.aliases.join(", ")
                )
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
