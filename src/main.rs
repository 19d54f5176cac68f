#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::uninlined_format_args)]

use anyhow::{bail, Result};
use clap::Parser;
use fitcoach::{agent, config, observability, Config};
use std::path::PathBuf;

/// `fitcoach` - a conversational fitness assistant.
#[derive(Parser, Debug)]
#[command(name = "fitcoach")]
#[command(version)]
#[command(
    about = "Chat about fitness, compute BMI, and get training plans.",
    long_about = "\
Chat about fitness, compute BMI, and get training plans.

Starts an interactive session on stdin/stdout. Type 計算 BMI, 健身計畫 or \
建議 to start a guided flow; anything else is answered by the configured \
model. Type 退出 to leave.

Examples:
  fitcoach                          # use ~/.fitcoach/config.toml
  fitcoach --provider offline       # static answers only, no model
  fitcoach --model llama3 --config-dir ./coach"
)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.fitcoach)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Provider to use (ollama, offline)
    #[arg(short, long)]
    provider: Option<String>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,
}

impl Cli {
    /// CLI flags win over the file and the environment.
    fn apply_to(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.default_provider.clone_from(provider);
        }
        if let Some(model) = &self.model {
            config.default_model.clone_from(model);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.config_dir {
        if dir.as_os_str().is_empty() {
            bail!("--config-dir cannot be empty");
        }
    }

    observability::init_logging()?;

    let config_dir = config::resolve_config_dir(cli.config_dir.as_deref())?;
    let mut config = Config::load_or_init(&config_dir).await?;
    cli.apply_to(&mut config);
    config.validate()?;

    agent::run(config).await
}
