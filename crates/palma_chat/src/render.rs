//! Plain-text rendering of transcript entries.

use std::io::{self, Write};

use crate::conversation::{ChatMessage, Role};

/// Write an assistant answer followed by its sources, if any.
/// User messages are echoed with a `> ` prefix.
pub fn render_message(out: &mut impl Write, message: &ChatMessage) -> io::Result<()> {
    match message.role {
        Role::User => writeln!(out, "> {}", message.content),
        Role::Assistant => {
            writeln!(out, "{}", message.content)?;
            if !message.sources.is_empty() {
                writeln!(out, "\nSources:")?;
                for source in &message.sources {
                    writeln!(out, "  {}", source.source)?;
                }
            }
            Ok(())
        }
    }
}
