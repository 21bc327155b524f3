//! # notemark-core
//!
//! Core library for the notemark note renderer.
//!
//! Converts extended-Markdown note sources into sanitized HTML, resolving
//! note-internal references (attachments, note links, tags, wikilinks) into
//! concrete application-meaningful links and embedding math and diagrams
//! along the way.

pub mod config;
pub mod markdown;
pub mod paths;
pub mod render;
pub mod strip;

pub use config::{Config, ConfigError};
pub use markdown::{DiagramRenderer, MarkdownRenderer, MathTypesetter, RenderError};
pub use render::Renderer;
pub use strip::{strip, StripError};
