//! Math typesetting seam.
//!
//! Inline and display math events are handed to an external typesetter. The
//! default implementation wraps the expression in MathJax-compatible markup
//! and leaves layout to the client.

use crate::markdown::events::{html_escape, into_static};
use anyhow::Result;
use pulldown_cmark::{CowStr, Event};

/// External math typesetting engine, configured once from static settings.
pub trait MathTypesetter: Send + Sync {
    fn typeset(&self, math: &str, display: bool) -> Result<String>;
}

/// Default typesetter: MathJax delimiters around the raw expression.
pub struct MathJaxTypesetter;

impl MathTypesetter for MathJaxTypesetter {
    fn typeset(&self, math: &str, display: bool) -> Result<String> {
        let escaped = html_escape(math);
        Ok(if display {
            format!(r#"<div class="math math-display" aria-label="{escaped}">\[{math}\]</div>"#)
        } else {
            format!(r#"<span class="math math-inline" aria-label="{escaped}">\({math}\)</span>"#)
        })
    }
}

/// Replace math events with typeset markup. Typesetter failures abort the
/// render.
pub fn apply(events: Vec<Event<'_>>, typesetter: &dyn MathTypesetter) -> Result<Vec<Event<'static>>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::InlineMath(math) => typesetter
                .typeset(&math, false)
                .map(|html| Event::InlineHtml(CowStr::Boxed(html.into_boxed_str()))),
            Event::DisplayMath(math) => typesetter
                .typeset(&math, true)
                .map(|html| Event::Html(CowStr::Boxed(html.into_boxed_str()))),
            other => Ok(into_static(other)),
        })
        .collect()
}
