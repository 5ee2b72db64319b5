//! Terminal chat panel for the Palma help API. The binary is a thin wrapper
//! over the plain functions here.

pub mod cli;
pub mod conversation;
pub mod render;

use palma_client::SessionStore;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub use conversation::{ChatMessage, Conversation, Role, FAILURE_MESSAGE};

/// Run one exchange for `question`, or one per non-blank line of `input`
/// until EOF. Answers are rendered to `out`; with `interactive` a
/// "Thinking…" hint is printed to stderr while each call is in flight.
pub async fn run_session<S, R, W>(
    conversation: &mut Conversation<S>,
    question: Option<&str>,
    input: R,
    out: &mut W,
    interactive: bool,
) -> io::Result<()>
where
    S: SessionStore,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Some(question) = question {
        return exchange(conversation, question, out, interactive).await;
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        exchange(conversation, &line, out, interactive).await?;
    }
    Ok(())
}

async fn exchange<S: SessionStore, W: Write>(
    conversation: &mut Conversation<S>,
    line: &str,
    out: &mut W,
    interactive: bool,
) -> io::Result<()> {
    if line.trim().is_empty() {
        return Ok(());
    }
    if interactive {
        eprintln!("Thinking…");
    }
    if let Some(reply) = conversation.send(line).await {
        render::render_message(out, reply)?;
        writeln!(out)?;
        out.flush()?;
    }
    Ok(())
}
