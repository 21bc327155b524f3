//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the notemark.yml schema.
///
/// Every section has a usable default, so an empty file (or no file at all)
/// yields a renderer that still works, just with the reference rule families
/// that need a root directory switched off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub attachments: AttachmentsConfig,

    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub math: MathConfig,

    #[serde(default)]
    pub diagrams: DiagramsConfig,

    // Internal: path to config file (for relative root resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentsConfig {
    /// Directory attachment references resolve against. `None` disables the
    /// attachment rule family entirely.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_attachments_token")]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Directory note references resolve against. `None` disables both the
    /// note rule family and the wikilink protocol.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_notes_token")]
    pub token: String,

    /// File extensions recognized as note paths. A wikilink target carrying
    /// one of these is used as-is; anything else gets `default_extension`
    /// appended.
    #[serde(default = "default_note_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_note_extension")]
    pub default_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    #[serde(default = "default_tags_token")]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fence info string that marks a diagram block.
    #[serde(default = "default_diagram_language")]
    pub language: String,
}

fn default_attachments_token() -> String {
    String::from("@attachment")
}

fn default_notes_token() -> String {
    String::from("@note")
}

fn default_tags_token() -> String {
    String::from("@tag")
}

fn default_note_extensions() -> Vec<String> {
    vec!["md".into(), "markdown".into(), "txt".into()]
}

fn default_note_extension() -> String {
    String::from("md")
}

fn default_diagram_language() -> String {
    String::from("mermaid")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        // Store config file path for relative root resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Get the attachments root, resolved relative to the config file
    pub fn attachments_root(&self) -> Option<PathBuf> {
        self.attachments.root.as_ref().map(|p| self.resolve_path(p))
    }

    /// Get the notes root, resolved relative to the config file
    pub fn notes_root(&self) -> Option<PathBuf> {
        self.notes.root.as_ref().map(|p| self.resolve_path(p))
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }
}

impl NotesConfig {
    /// Whether a wikilink target already carries a recognized note extension.
    pub fn is_recognized_path(&self, target: &str) -> bool {
        let Some((_, ext)) = target.rsplit_once('.') else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            root: None,
            token: default_attachments_token(),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            root: None,
            token: default_notes_token(),
            extensions: default_note_extensions(),
            default_extension: default_note_extension(),
        }
    }
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            token: default_tags_token(),
        }
    }
}

impl Default for MathConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_diagram_language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.attachments.token, "@attachment");
        assert_eq!(config.notes.token, "@note");
        assert_eq!(config.tags.token, "@tag");
        assert_eq!(config.notes.default_extension, "md");
        assert!(config.attachments.root.is_none());
        assert!(config.math.enabled);
        assert_eq!(config.diagrams.language, "mermaid");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r##"
notes:
  root: /vault/notes
tags:
  token: "#tag"
"##;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.notes.root.as_deref(), Some(Path::new("/vault/notes")));
        assert_eq!(config.notes.token, "@note");
        assert_eq!(config.tags.token, "#tag");
        assert!(config.attachments.root.is_none());
    }

    #[test]
    fn test_from_file_resolves_relative_roots() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("notemark.yml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "attachments:\n  root: files").unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.attachments_root(), Some(dir.path().join("files")));
    }

    #[test]
    fn test_recognized_path() {
        let notes = NotesConfig::default();
        assert!(notes.is_recognized_path("plan.md"));
        assert!(notes.is_recognized_path("plan.TXT"));
        assert!(!notes.is_recognized_path("plan"));
        assert!(!notes.is_recognized_path("archive.tar"));
    }
}
