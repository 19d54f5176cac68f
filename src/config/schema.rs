use crate::prompt::PromptTemplate;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

const CONFIG_FILE_NAME: &str = "config.toml";

// ── Top-level config ──────────────────────────────────────────────

/// Top-level fitcoach configuration, loaded from `config.toml`.
///
/// Resolution order: `--config-dir` / `FITCOACH_CONFIG_DIR` → `~/.fitcoach/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Generation backend (`"ollama"` or `"offline"`). Default: `"ollama"`.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model identifier passed to the backend. Default: `"llama2"`.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Base URL override for the backend (e.g. "http://10.0.0.1:11434" for remote Ollama)
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request backend timeout in seconds. Default: `60`.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Conversation behavior (`[assistant]`).
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Assistant behavior configuration (`[assistant]` section).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Ask the model for plan and advice text before using the static library.
    /// Default: `true`.
    #[serde(default = "default_true")]
    pub enrich_with_model: bool,
    /// Replacement chat template. Must contain `{history}` and `{input}`.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

fn default_provider() -> String {
    "ollama".into()
}

fn default_model() -> String {
    "llama2".into()
}

fn default_provider_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enrich_with_model: true,
            prompt_template: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            api_url: None,
            provider_timeout_secs: default_provider_timeout_secs(),
            assistant: AssistantConfig::default(),
        }
    }
}

fn default_config_dir() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".fitcoach"))
}

/// Pick the config directory: explicit override, then `FITCOACH_CONFIG_DIR`,
/// then `~/.fitcoach`.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(custom) = std::env::var("FITCOACH_CONFIG_DIR") {
        let custom = custom.trim();
        if !custom.is_empty() {
            return Ok(PathBuf::from(custom));
        }
    }
    default_config_dir()
}

impl Config {
    /// Load config from `config_dir`, writing a default file on first run.
    /// Environment overrides are applied and the result is validated.
    pub async fn load_or_init(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        fs::create_dir_all(config_dir).await.with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        let initialized = !config_path.exists();
        let mut config = if initialized {
            let mut config = Config::default();
            config.config_path = config_path;
            config.save().await?;
            config
        } else {
            let contents = fs::read_to_string(&config_path)
                .await
                .context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            // Set computed paths that are skipped during serialization
            config.config_path = config_path;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        tracing::info!(
            path = %config.config_path.display(),
            provider = %config.default_provider,
            model = %config.default_model,
            initialized,
            "Config loaded"
        );
        Ok(config)
    }

    /// Apply `FITCOACH_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_empty("FITCOACH_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = non_empty("FITCOACH_MODEL") {
            self.default_model = model;
        }
        if let Some(url) = non_empty("FITCOACH_API_URL") {
            self.api_url = Some(url);
        }
    }

    /// Validate values that would otherwise fail at an arbitrary turn.
    pub fn validate(&self) -> Result<()> {
        if self.default_provider.trim().is_empty() {
            anyhow::bail!("default_provider must not be empty");
        }
        if !crate::providers::is_known_provider(&self.default_provider) {
            anyhow::bail!(
                "default_provider {:?} is not supported. Available: {}",
                self.default_provider,
                crate::providers::describe_providers()
            );
        }
        if self.default_model.trim().is_empty() {
            anyhow::bail!("default_model must not be empty");
        }
        if self.provider_timeout_secs == 0 {
            anyhow::bail!("provider_timeout_secs must be greater than 0");
        }
        self.prompt_template()
            .context("assistant.prompt_template is invalid")?;
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// The chat template: the configured override, or the built-in framing.
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match &self.assistant.prompt_template {
            Some(template) => PromptTemplate::new(template.as_str()),
            None => Ok(PromptTemplate::default()),
        }
    }

    pub async fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let parent_dir = self
            .config_path
            .parent()
            .context("Config path must have a parent directory")?;
        fs::create_dir_all(parent_dir).await.with_context(|| {
            format!(
                "Failed to create config directory: {}",
                parent_dir.display()
            )
        })?;

        fs::write(&self.config_path, toml_str)
            .await
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
        Ok(())
    }
}
