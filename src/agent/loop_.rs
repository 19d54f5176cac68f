use super::assistant::{FitnessAssistant, SessionState, GREETING, INPUT_HINT};
use crate::config::Config;
use anyhow::{Context, Result};
use console::style;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Run the interactive session on stdin/stdout until the user confirms exit
/// or stdin closes.
pub async fn run(config: Config) -> Result<()> {
    let mut assistant = FitnessAssistant::from_config(&config)?;
    tracing::info!(
        provider = assistant.provider_name(),
        model = assistant.model(),
        "session started"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(&mut assistant, stdin, &mut stdout).await
}

/// Drive an assistant from any line source. Each input line gets exactly one
/// printed reply.
pub async fn run_session<R, W>(
    assistant: &mut FitnessAssistant,
    reader: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{GREETING}")?;

    let mut lines = reader.lines();
    loop {
        if *assistant.state() == SessionState::AwaitingInput {
            writeln!(out, "\n{INPUT_HINT}")?;
        }
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            tracing::info!("input closed, ending session");
            break;
        };

        let reply = assistant.handle(&line).await;
        let text = if reply.error.is_some() {
            style(reply.text).yellow().to_string()
        } else {
            reply.text
        };
        writeln!(out, "\n{}{text}", style("助手：").cyan().bold())?;

        if assistant.is_exited() {
            break;
        }
    }

    out.flush()?;
    Ok(())
}
