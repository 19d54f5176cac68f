//! Per-turn trace events.

use tracing::{debug, info};

/// Emit one structured event for a completed turn.
///
/// Events go to the `fitcoach::turn` target so they can be enabled on their own,
/// e.g. `RUST_LOG=fitcoach::turn=info`.
pub fn record_turn(
    turn: u64,
    intent: &str,
    flow: &str,
    fallback: bool,
    error_kind: Option<&str>,
    reply_chars: usize,
) {
    info!(
        target: "fitcoach::turn",
        turn,
        intent,
        flow,
        fallback,
        error_kind = error_kind.unwrap_or("none"),
        reply_chars,
        "turn completed"
    );
}

/// Emit an event for a backend call, including how long it took.
pub fn record_generation(provider: &str, model: &str, elapsed_ms: u128, produced_text: bool) {
    debug!(
        target: "fitcoach::turn",
        provider,
        model,
        elapsed_ms = u64::try_from(elapsed_ms).unwrap_or(u64::MAX),
        produced_text,
        "generation finished"
    );
}
