//! Plain-text projection of Markdown sources.
//!
//! Independent of the HTML pipeline: no configuration, no shared state, and
//! an async seam so callers can project many previews concurrently with
//! ongoing renders.

use pulldown_cmark::{Event, Parser, TagEnd};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripError {
    #[error("plain text projection task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Strip all Markdown formatting, keeping the text content.
pub async fn strip(source: &str) -> Result<String, StripError> {
    let source = source.to_owned();
    let text = tokio::task::spawn_blocking(move || strip_sync(&source)).await?;
    Ok(text)
}

fn strip_sync(source: &str) -> String {
    let mut out = String::new();

    for event in Parser::new(source) {
        match event {
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => out.push_str(&code),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_)
                | TagEnd::TableRow,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::TableCell) => out.push(' '),
            _ => {}
        }
    }

    out.trim_end().to_string()
}
