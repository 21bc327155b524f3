//! Markdown extension pipeline.
//!
//! Source-stage rules rewrite the raw text (special-link encoding, wikilink
//! capture, diagram substitution), the generic engine converts it, and
//! output-stage transformers rewrite the emitted events (math, references,
//! highlighting). Wikilink restoration runs last, on the HTML string, so no
//! downstream rule can re-match the regenerated `@note/` anchors.

pub mod diagrams;
pub mod encode_links;
pub mod events;
pub mod highlight;
pub mod references;
pub mod typeset;
pub mod wikilinks;

use crate::config::{Config, NotesConfig};
use diagrams::{ClientSideDiagramRenderer, DiagramRule};
use encode_links::SpecialLinkEncoder;
use events::into_static;
use highlight::HighlightTransformer;
use pulldown_cmark::{html, Event, Options, Parser};
use references::ReferenceTransformer;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use typeset::MathJaxTypesetter;
use wikilinks::WikilinkVault;

pub use diagrams::{diagram_id, DiagramRenderer};
pub use typeset::MathTypesetter;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("diagram rendering failed: {0}")]
    Diagram(#[source] anyhow::Error),

    #[error("math typesetting failed: {0}")]
    Math(#[source] anyhow::Error),
}

/// The extension pipeline around the generic Markdown engine. Built once per
/// process from a fixed configuration and reused for every render.
pub struct MarkdownRenderer {
    options: Options,
    encoder: SpecialLinkEncoder,
    diagram_rule: Option<DiagramRule>,
    references: ReferenceTransformer,
    highlight: HighlightTransformer,
    typesetter: Option<Arc<dyn MathTypesetter>>,
    // None when no notes root is configured; wikilinks then pass through as
    // literal text.
    notes: Option<NotesConfig>,
}

impl MarkdownRenderer {
    /// Pipeline with the default collaborators (MathJax markup, client-side
    /// diagrams).
    pub fn new(config: &Config) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(MathJaxTypesetter),
            Arc::new(ClientSideDiagramRenderer),
        )
    }

    pub fn with_collaborators(
        config: &Config,
        typesetter: Arc<dyn MathTypesetter>,
        diagrams: Arc<dyn DiagramRenderer>,
    ) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        if config.math.enabled {
            options.insert(Options::ENABLE_MATH);
        }

        let encoder = SpecialLinkEncoder::new(&[
            config.attachments.token.as_str(),
            config.notes.token.as_str(),
            config.tags.token.as_str(),
        ]);

        let diagram_rule = config
            .diagrams
            .enabled
            .then(|| DiagramRule::new(&config.diagrams.language, diagrams));

        Self {
            options,
            encoder,
            diagram_rule,
            references: ReferenceTransformer::new(references::build_rules(config)),
            highlight: HighlightTransformer::new(),
            typesetter: config.math.enabled.then_some(typesetter),
            notes: config.notes_root().is_some().then(|| config.notes.clone()),
        }
    }

    /// Convert one document. Pure in the source given fixed configuration;
    /// the wikilink vault lives entirely inside this call, so renders may run
    /// concurrently without corrupting each other's placeholders.
    pub fn render(&self, source: &str) -> Result<String, RenderError> {
        let mut vault = WikilinkVault::new();

        // Source stage, fixed order: encode, protect, diagrams.
        let encoded = self.encoder.apply(source);
        let captured = if self.notes.is_some() {
            vault.capture(&encoded)
        } else {
            Cow::Borrowed(encoded.as_ref())
        };
        let text = match &self.diagram_rule {
            Some(rule) => rule.apply(&captured).map_err(RenderError::Diagram)?,
            None => Cow::Borrowed(captured.as_ref()),
        };

        // Generic conversion.
        let events: Vec<Event> = Parser::new_ext(&text, self.options).collect();

        // Output stage, fixed order: math, references, highlighting.
        let events = match &self.typesetter {
            Some(typesetter) => {
                typeset::apply(events, typesetter.as_ref()).map_err(RenderError::Math)?
            }
            None => events.into_iter().map(into_static).collect(),
        };
        let events = self.references.transform(events);
        let events = self.highlight.transform(events);

        let mut output = String::new();
        html::push_html(&mut output, events.into_iter());

        // Restore runs last; consuming the vault resets it on every path.
        Ok(match &self.notes {
            Some(notes) => vault.drain(output, notes),
            None => output,
        })
    }
}
