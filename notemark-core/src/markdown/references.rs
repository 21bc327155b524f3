//! Output-stage rewriting of attachment, note and tag references.
//!
//! Emitted `Image`/`Link` events whose destination starts with a configured
//! token are rewritten into application-meaningful markup. Family order is
//! fixed (attachment, then note, then tag), and an explicitly empty anchor
//! body is matched before the general anchor so the "button" shape never
//! falls through to the inline rule.

use crate::config::Config;
use crate::markdown::events::{html_escape, into_static};
use crate::paths;
use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use std::path::PathBuf;
use tracing::debug;

/// One reference rule family. Attachment and note rules only exist when their
/// root directory is configured; tags are in-app references and always apply.
#[derive(Debug, Clone)]
pub enum ReferenceRule {
    Attachment { token: String, root: PathBuf },
    Note { token: String, root: PathBuf },
    Tag { token: String },
}

impl ReferenceRule {
    fn token(&self) -> &str {
        match self {
            ReferenceRule::Attachment { token, .. }
            | ReferenceRule::Note { token, .. }
            | ReferenceRule::Tag { token } => token,
        }
    }

    /// Attachment images become local-file `<img>` tags. Other kinds have no
    /// image shape.
    fn rewrite_image(&self, encoded: &str, alt: &str, title: &str) -> Option<String> {
        let ReferenceRule::Attachment { root, .. } = self else {
            return None;
        };
        let resolved = paths::resolve(root, encoded);
        let src = html_escape(&format!("file://{}", resolved.path.display()));
        let filename = html_escape(&resolved.reference);

        let mut html =
            format!(r#"<img src="{src}" class="attachment" data-filename="{filename}""#);
        if !alt.is_empty() {
            html.push_str(&format!(r#" alt="{}""#, html_escape(alt)));
        }
        if !title.is_empty() {
            html.push_str(&format!(r#" title="{}""#, html_escape(title)));
        }
        html.push('>');
        Some(html)
    }

    /// Empty-bodied anchor: a self-contained button with icon and label.
    fn rewrite_button(&self, encoded: &str) -> String {
        match self {
            ReferenceRule::Attachment { root, .. } => {
                let resolved = paths::resolve(root, encoded);
                let href = html_escape(&format!("file://{}", resolved.path.display()));
                format!(
                    r#"<a href="{href}" class="attachment button gray" data-filename="{}"><i class="icon small">paperclip</i><span>{}</span></a>"#,
                    html_escape(&resolved.reference),
                    html_escape(&resolved.basename)
                )
            }
            ReferenceRule::Note { root, .. } => {
                let resolved = paths::resolve(root, encoded);
                let path = html_escape(&resolved.path.display().to_string());
                format!(
                    r#"<a href="file://{path}" class="note button gray" data-filepath="{path}"><i class="icon small">note</i><span>{}</span></a>"#,
                    html_escape(&resolved.basename)
                )
            }
            ReferenceRule::Tag { .. } => {
                let tag = html_escape(&paths::decode(encoded));
                format!(
                    r##"<a href="#" class="tag button gray" data-tag="{tag}"><i class="icon small">tag</i><span>{tag}</span></a>"##
                )
            }
        }
    }

    /// Anchor with body: only the opening tag is replaced, the body events
    /// flow through untouched.
    fn rewrite_open(&self, encoded: &str) -> String {
        match self {
            ReferenceRule::Attachment { root, .. } => {
                let resolved = paths::resolve(root, encoded);
                let href = html_escape(&format!("file://{}", resolved.path.display()));
                format!(
                    r#"<a href="{href}" class="attachment" data-filename="{}"><i class="icon xsmall">paperclip</i>"#,
                    html_escape(&resolved.reference)
                )
            }
            ReferenceRule::Note { root, .. } => {
                let resolved = paths::resolve(root, encoded);
                let path = html_escape(&resolved.path.display().to_string());
                format!(
                    r#"<a href="file://{path}" class="note" data-filepath="{path}"><i class="icon xsmall">note</i>"#
                )
            }
            ReferenceRule::Tag { .. } => {
                let tag = html_escape(&paths::decode(encoded));
                format!(
                    r##"<a href="#" class="tag" data-tag="{tag}"><i class="icon xsmall">tag</i>"##
                )
            }
        }
    }
}

/// Build the ordered rule list for a configuration. Families without a
/// configured root contribute nothing.
pub fn build_rules(config: &Config) -> Vec<ReferenceRule> {
    let mut rules = Vec::new();

    if let Some(root) = config.attachments_root() {
        rules.push(ReferenceRule::Attachment {
            token: config.attachments.token.clone(),
            root,
        });
    } else {
        debug!("no attachments root configured, attachment rules disabled");
    }

    if let Some(root) = config.notes_root() {
        rules.push(ReferenceRule::Note {
            token: config.notes.token.clone(),
            root,
        });
    } else {
        debug!("no notes root configured, note rules disabled");
    }

    rules.push(ReferenceRule::Tag {
        token: config.tags.token.clone(),
    });

    rules
}

pub struct ReferenceTransformer {
    rules: Vec<ReferenceRule>,
}

impl ReferenceTransformer {
    pub fn new(rules: Vec<ReferenceRule>) -> Self {
        Self { rules }
    }

    /// First rule whose `token/` prefixes the destination, plus the encoded
    /// path remainder. Token collisions are a configuration precondition;
    /// rule order decides any overlap.
    fn match_rule<'a>(&'a self, dest: &'a str) -> Option<(&'a ReferenceRule, &'a str)> {
        self.rules.iter().find_map(|rule| {
            dest.strip_prefix(rule.token())
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rule, rest))
        })
    }

    pub fn transform(&self, events: Vec<Event<'_>>) -> Vec<Event<'static>> {
        let mut result = Vec::new();
        let mut open_rewritten = 0usize;
        let mut i = 0;

        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    let rewritten = self
                        .match_rule(dest_url)
                        .and_then(|(rule, encoded)| {
                            // The image body is its alt text.
                            let mut alt = String::new();
                            let mut j = i + 1;
                            while j < events.len()
                                && !matches!(events[j], Event::End(TagEnd::Image))
                            {
                                if let Event::Text(text) = &events[j] {
                                    alt.push_str(text.as_ref());
                                }
                                j += 1;
                            }
                            rule.rewrite_image(encoded, &alt, title).map(|html| (html, j))
                        });

                    if let Some((html, end)) = rewritten {
                        result.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
                        i = end + 1;
                    } else {
                        result.push(into_static(events[i].clone()));
                        i += 1;
                    }
                }
                Event::Start(Tag::Link { dest_url, .. }) => {
                    if let Some((rule, encoded)) = self.match_rule(dest_url) {
                        if matches!(events.get(i + 1), Some(Event::End(TagEnd::Link))) {
                            let html = rule.rewrite_button(encoded);
                            result.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
                            i += 2;
                        } else {
                            let html = rule.rewrite_open(encoded);
                            result.push(Event::Html(CowStr::Boxed(html.into_boxed_str())));
                            open_rewritten += 1;
                            i += 1;
                        }
                    } else {
                        result.push(into_static(events[i].clone()));
                        i += 1;
                    }
                }
                Event::End(TagEnd::Link) if open_rewritten > 0 => {
                    open_rewritten -= 1;
                    result.push(Event::Html(CowStr::Borrowed("</a>")));
                    i += 1;
                }
                _ => {
                    result.push(into_static(events[i].clone()));
                    i += 1;
                }
            }
        }

        result
    }
}
