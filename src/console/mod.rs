//! Console front-end — reads lines from stdin, dispatches them to the
//! [`TravelAgent`], prints replies to stdout.
//!
//! One line is handled to completion before the next is read. Runs until
//! `/quit`, end of input, or the `shutdown` token is cancelled (Ctrl-C).
//! Errors from a single line are printed inline and the loop carries on.

pub mod command;

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agents::TravelAgent;
use crate::agents::budget::ACTIVITY_CHOICES;
use crate::agents::spot;
use crate::config::expand_home;
use crate::error::AppError;
use crate::export;
use command::Command;

enum Outcome {
    Reply(String),
    Quit,
}

/// Run the REPL on the process's stdin/stdout.
pub async fn run(
    agent: &mut TravelAgent,
    app_name: &str,
    export_dir: PathBuf,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    writeln!(stdout, "─────────────────────────────────")?;
    writeln!(stdout, " {app_name}: your AI travel planner  (/help, Ctrl-C to quit)")?;
    writeln!(stdout, "─────────────────────────────────")?;
    run_with(agent, &export_dir, stdin, &mut stdout, shutdown).await
}

/// REPL over arbitrary input/output; `run` wires this to stdin/stdout.
pub async fn run_with<R, W>(
    agent: &mut TravelAgent,
    export_dir: &std::path::Path,
    input: R,
    out: &mut W,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!(session_id = %agent.session().id(), provider = agent.provider().name(), "console started");
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                writeln!(out, "\nshutdown signal received — goodbye")?;
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!("console read error: {e}");
                break;
            }
            Ok(None) => {
                info!("console input closed");
                break;
            }
            Ok(Some(input)) => input,
        };

        let result = match command::parse(&input) {
            Ok(cmd) => {
                debug!(command = ?cmd, "console command");
                dispatch(agent, cmd, export_dir).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(Outcome::Quit) => {
                writeln!(out, "Safe travels!")?;
                break;
            }
            Ok(Outcome::Reply(text)) if text.is_empty() => {}
            Ok(Outcome::Reply(text)) => writeln!(out, "{text}\n")?,
            Err(e) => {
                warn!(error = %e, "console command failed");
                writeln!(out, "error: {e}\n")?;
            }
        }
    }

    Ok(())
}

async fn dispatch(
    agent: &mut TravelAgent,
    cmd: Command,
    export_dir: &std::path::Path,
) -> Result<Outcome, AppError> {
    let text = match cmd {
        Command::Nothing => String::new(),
        Command::Chat(message) => agent.chat(&message).await?,
        Command::Budget(request) => {
            let table = agent.budget(&request).await?;
            format!("### Estimated Budget\n{table}")
        }
        Command::Where(path) => {
            let image = spot::load_image(&expand_home(&path.to_string_lossy())).await?;
            let reply = agent.locate_spot(&image).await?;
            format!("### Detected Spot & Suggestions\n{reply}")
        }
        Command::History => format_history(agent),
        Command::Export { stem, selection } => {
            let content = export::assemble(selection, agent.session());
            let path = export::write(export_dir, &stem, &content)?;
            format!("saved {}", path.display())
        }
        Command::Help => format!("{}\n\nActivity ideas: {}", command::HELP, ACTIVITY_CHOICES.join(", ")),
        Command::Quit => return Ok(Outcome::Quit),
    };
    Ok(Outcome::Reply(text))
}

fn format_history(agent: &TravelAgent) -> String {
    let session = agent.session();
    if session.is_empty() {
        return "(no conversation yet)".to_string();
    }
    session
        .history_as_context()
        .map(|turn| format!("{}: {}", turn.role().title(), turn.text()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
