//! Source-stage diagram blocks.
//!
//! Fenced blocks tagged with the configured diagram language are handed to a
//! [`DiagramRenderer`] collaborator before the generic conversion runs, and
//! replaced by the rendered markup in a wrapper div.

use crate::markdown::events::html_escape;
use anyhow::Result;
use regex::Regex;
use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// External diagram engine. `render` is called synchronously; `id` is stable
/// for identical `source`, which renderers needing a DOM anchor rely on.
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, id: &str, source: &str) -> Result<String>;
}

/// Default renderer: emits the diagram source in an identified block for a
/// client-side engine to lay out.
pub struct ClientSideDiagramRenderer;

impl DiagramRenderer for ClientSideDiagramRenderer {
    fn render(&self, id: &str, source: &str) -> Result<String> {
        Ok(format!(
            r#"<pre class="diagram-source" id="{id}">{}</pre>"#,
            html_escape(source)
        ))
    }
}

/// Content-derived identifier for a diagram block. Not cryptographic; it only
/// needs to be stable and unique enough for a DOM id.
pub fn diagram_id(source: &str) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    source.hash(&mut hasher);
    format!("diagram-{:016x}", hasher.finish())
}

pub struct DiagramRule {
    pattern: Regex,
    renderer: Arc<dyn DiagramRenderer>,
}

impl DiagramRule {
    pub fn new(language: &str, renderer: Arc<dyn DiagramRenderer>) -> Self {
        let pattern = Regex::new(&format!(r"```{}[ \t]*\n([^`]*)```", regex::escape(language)))
            .expect("diagram fence pattern is valid");
        Self { pattern, renderer }
    }

    /// Replace every diagram fence with rendered markup. A renderer failure
    /// aborts the whole render.
    pub fn apply<'a>(&self, text: &'a str) -> Result<Cow<'a, str>> {
        let mut out = String::new();
        let mut last = 0;

        for caps in self.pattern.captures_iter(text) {
            let whole = caps.get(0).expect("group 0 always present");
            let body = &caps[1];
            let markup = self.renderer.render(&diagram_id(body), body)?;

            out.push_str(&text[last..whole.start()]);
            out.push_str("<div class=\"diagram\">");
            out.push_str(&markup);
            out.push_str("</div>");
            last = whole.end();
        }

        if last == 0 {
            return Ok(Cow::Borrowed(text));
        }
        out.push_str(&text[last..]);
        Ok(Cow::Owned(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_diagram_id_is_deterministic() {
        let a = diagram_id("graph TD; A-->B;");
        let b = diagram_id("graph TD; A-->B;");
        assert_eq!(a, b);
        assert!(a.starts_with("diagram-"));
    }

    #[test]
    fn test_diagram_id_differs_for_different_sources() {
        assert_ne!(diagram_id("graph TD; A;"), diagram_id("graph TD; B;"));
    }

    #[test]
    fn test_apply_replaces_fence() {
        let rule = DiagramRule::new("mermaid", Arc::new(ClientSideDiagramRenderer));
        let input = "before\n```mermaid\ngraph TD; A-->B;\n```\nafter";
        let out = rule.apply(input).unwrap();
        assert!(out.contains("<div class=\"diagram\">"));
        assert!(out.contains("graph TD; A--&gt;B;"));
        assert!(!out.contains("```"));
    }

    #[test]
    fn test_apply_leaves_other_fences() {
        let rule = DiagramRule::new("mermaid", Arc::new(ClientSideDiagramRenderer));
        let input = "```rust\nfn main() {}\n```";
        assert_eq!(rule.apply(input).unwrap(), input);
    }

    struct FailingRenderer;

    impl DiagramRenderer for FailingRenderer {
        fn render(&self, _id: &str, _source: &str) -> Result<String> {
            Err(anyhow!("layout engine unavailable"))
        }
    }

    #[test]
    fn test_renderer_failure_propagates() {
        let rule = DiagramRule::new("mermaid", Arc::new(FailingRenderer));
        assert!(rule.apply("```mermaid\nX\n```").is_err());
    }
}
