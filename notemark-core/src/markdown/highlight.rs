//! Code syntax highlighting using syntect.

use crate::markdown::events::{html_escape, into_static};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        theme_set
            .themes
            .get("InspiredGitHub")
            .or_else(|| theme_set.themes.get("base16-ocean.light"))
            .expect("syntect default themes present")
            .clone()
    })
}

/// Transformer for syntax highlighting fenced code blocks.
pub struct HighlightTransformer;

impl HighlightTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, events: Vec<Event<'_>>) -> Vec<Event<'static>> {
        let mut result = Vec::new();
        let mut current: Option<(String, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if !lang.is_empty() => {
                    current = Some((lang.to_string(), String::new()));
                }
                Event::Text(text) if current.is_some() => {
                    if let Some((_, code)) = current.as_mut() {
                        code.push_str(text.as_ref());
                    }
                }
                Event::End(TagEnd::CodeBlock) if current.is_some() => {
                    let (lang, code) = current.take().expect("checked above");
                    let html = highlight_code(&code, &lang);
                    result.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
                }
                other => result.push(into_static(other)),
            }
        }

        result
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn highlight_code(code: &str, lang: &str) -> String {
    let ss = syntax_set();
    let syntax = ss
        .find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(lang))
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    match highlighted_html_for_string(code, ss, syntax, theme()) {
        Ok(html) => html,
        Err(_) => format!("<pre><code>{}</code></pre>", html_escape(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    #[test]
    fn test_highlights_fenced_rust() {
        let events: Vec<Event> = Parser::new("```rust\nfn main() {}\n```").collect();
        let out = HighlightTransformer::new().transform(events);
        assert!(out
            .iter()
            .any(|e| matches!(e, Event::Html(html) if html.contains("<pre"))));
    }

    #[test]
    fn test_untagged_block_passes_through() {
        let events: Vec<Event> = Parser::new("```\nplain\n```").collect();
        let out = HighlightTransformer::new().transform(events);
        assert!(out
            .iter()
            .any(|e| matches!(e, Event::Start(Tag::CodeBlock(_)))));
    }
}
