//! Source-stage encoder for special link destinations.
//!
//! `[text](@attachment/some file.png)` is not a valid CommonMark link because
//! of the space in the destination. This rule percent-encodes the path part of
//! any token-prefixed destination so the generic engine parses it, and must
//! run before every other source-stage rule.

use crate::paths;
use regex::{Captures, Regex};
use std::borrow::Cow;

pub struct SpecialLinkEncoder {
    pattern: Option<Regex>,
}

impl SpecialLinkEncoder {
    /// Build the encoder for a set of reference tokens. Tokens are treated as
    /// literals; an empty set yields a no-op encoder.
    pub fn new<T: AsRef<str>>(tokens: &[T]) -> Self {
        let tokens: Vec<&str> = tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Self { pattern: None };
        }

        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\[([^\]]*)\]\(({alternation})/([^)]*)\)"))
            .expect("special link pattern is valid");

        Self {
            pattern: Some(pattern),
        }
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(pattern) = &self.pattern else {
            return Cow::Borrowed(text);
        };

        pattern.replace_all(text, |caps: &Captures| {
            format!(
                "[{}]({}/{})",
                &caps[1],
                &caps[2],
                paths::encode_reference(&caps[3])
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> SpecialLinkEncoder {
        SpecialLinkEncoder::new(&["@attachment", "@note", "@tag"])
    }

    #[test]
    fn test_encodes_spaces_in_destination() {
        let out = encoder().apply("See [doc](@attachment/a b.png) here");
        assert_eq!(out, "See [doc](@attachment/a%20b.png) here");
    }

    #[test]
    fn test_leaves_ordinary_links_alone() {
        let input = "A [link](https://example.com/a b) outside the tokens";
        assert_eq!(encoder().apply(input), input);
    }

    #[test]
    fn test_is_idempotent() {
        let once = encoder().apply("[x](@note/plan b.md)").into_owned();
        let twice = encoder().apply(&once).into_owned();
        assert_eq!(once, twice);
        assert_eq!(once, "[x](@note/plan%20b.md)");
    }

    #[test]
    fn test_matches_image_destinations() {
        // The `!` prefix is outside the match, so images encode too.
        let out = encoder().apply("![alt](@attachment/pic 1.png)");
        assert_eq!(out, "![alt](@attachment/pic%201.png)");
    }
}
