//! Placeholder protection for [[target]] and [[target|display]] wikilinks.
//!
//! Wikilink syntax overlaps with ordinary Markdown link syntax, so it cannot
//! survive the generic conversion stage intact. The vault captures every
//! wikilink at the source stage, substitutes an opaque sentinel, and restores
//! a resolved `@note/` anchor into the emitted HTML afterwards.
//!
//! The vault is scoped to a single render call: it is created inside
//! `MarkdownRenderer::render` and consumed by [`WikilinkVault::drain`], so
//! entries can never leak into an unrelated render.

use crate::config::NotesConfig;
use crate::markdown::events::html_escape;
use crate::paths;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

// The optional backtick group stands in for a lookbehind: a wikilink opened
// right after a backtick is inline code and stays untouched.
static WIKILINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(`?)\[\[([^\[\]]+?)\]\]").expect("wikilink pattern is valid"));

fn placeholder(index: usize) -> String {
    format!("%%WIKILINK{index}%%")
}

/// Per-render registry of captured wikilink contents, indexed by insertion
/// order. Each index maps to exactly one sentinel occurrence in the text.
#[derive(Debug, Default)]
pub struct WikilinkVault {
    entries: Vec<String>,
}

impl WikilinkVault {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Source stage: swap every wikilink for a sentinel and record its
    /// content at the next index.
    pub fn capture<'a>(&mut self, text: &'a str) -> Cow<'a, str> {
        WIKILINK.replace_all(text, |caps: &Captures| {
            if &caps[1] == "`" {
                return caps[0].to_string();
            }
            let index = self.entries.len();
            self.entries.push(caps[2].to_string());
            format!("{}{}", &caps[1], placeholder(index))
        })
    }

    /// Output stage, runs last: resolve every captured wikilink into a
    /// note-scoped anchor and substitute its sentinel occurrences.
    ///
    /// Consumes the vault, so a drained vault is guaranteed empty.
    pub fn drain(self, mut html: String, notes: &NotesConfig) -> String {
        for (index, raw) in self.entries.into_iter().enumerate() {
            let (target, display) = match raw.split_once('|') {
                Some((target, display)) => (target.trim(), display.trim()),
                None => (raw.trim(), raw.trim()),
            };

            let target = paths::decode(target);
            // Empty targets still produce an anchor: best effort, never a
            // failed render.
            let basename = if notes.is_recognized_path(&target) {
                target
            } else {
                format!("{}.{}", target, notes.default_extension)
            };

            let anchor = format!(
                r#"<a href="@note/{}">{}</a>"#,
                html_escape(&basename),
                html_escape(display)
            );
            html = html.replace(&placeholder(index), &anchor);
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> NotesConfig {
        NotesConfig::default()
    }

    #[test]
    fn test_capture_replaces_with_sentinel() {
        let mut vault = WikilinkVault::new();
        let out = vault.capture("See [[Project Plan]] today");
        assert_eq!(out, "See %%WIKILINK0%% today");
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_capture_skips_inline_code() {
        let mut vault = WikilinkVault::new();
        let input = "literal `[[not a link]]` here";
        assert_eq!(vault.capture(input), input);
        assert_eq!(vault.len(), 0);
    }

    #[test]
    fn test_drain_appends_default_extension() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[Project Plan]]").into_owned();
        let html = vault.drain(text, &notes());
        assert_eq!(html, r#"<a href="@note/Project Plan.md">Project Plan</a>"#);
    }

    #[test]
    fn test_drain_keeps_recognized_extension() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[notes/plan.txt]]").into_owned();
        let html = vault.drain(text, &notes());
        assert!(html.contains(r#"href="@note/notes/plan.txt""#));
    }

    #[test]
    fn test_drain_splits_target_and_display() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[Plan|see here]]").into_owned();
        let html = vault.drain(text, &notes());
        assert_eq!(html, r#"<a href="@note/Plan.md">see here</a>"#);
    }

    #[test]
    fn test_drain_decodes_percent_encoding() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[Project%20Plan]]").into_owned();
        let html = vault.drain(text, &notes());
        assert!(html.contains(r#"href="@note/Project Plan.md""#));
    }

    #[test]
    fn test_indices_are_isolated() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[A]] and [[B]]").into_owned();
        assert_eq!(text, "%%WIKILINK0%% and %%WIKILINK1%%");
        let html = vault.drain(text, &notes());
        assert_eq!(
            html,
            r#"<a href="@note/A.md">A</a> and <a href="@note/B.md">B</a>"#
        );
    }

    #[test]
    fn test_identical_wikilinks_get_distinct_indices() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[A]] twice [[A]]").into_owned();
        assert_eq!(text, "%%WIKILINK0%% twice %%WIKILINK1%%");
        assert_eq!(vault.len(), 2);
    }

    #[test]
    fn test_escapes_display_text() {
        let mut vault = WikilinkVault::new();
        let text = vault.capture("[[a|<b>]]").into_owned();
        let html = vault.drain(text, &notes());
        assert!(html.contains("&lt;b&gt;"));
    }
}
