pub mod runtime_trace;

pub use runtime_trace::{record_generation, record_turn};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Respects `RUST_LOG`, defaults to `warn` so
/// log lines stay out of the chat transcript. Logs go to stderr.
pub fn init_logging() -> anyhow::Result<()> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))
}
