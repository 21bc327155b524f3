//! CLI command implementations.

use anyhow::{Context, Result};
use notemark_core::{strip, Config, Renderer};
use std::fs;
use std::path::Path;
use tracing::debug;

const STARTER_CONFIG: &str = "\
# notemark configuration
#
# Reference kinds without a root directory are simply disabled.
attachments:
  root: attachments
  token: \"@attachment\"

notes:
  root: notes
  token: \"@note\"
  default_extension: md

tags:
  token: \"@tag\"

math:
  enabled: true

diagrams:
  enabled: true
  language: mermaid
";

fn load_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))
    } else {
        debug!(path = %config_path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

pub fn render_note(config_path: &Path, file: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read note {}", file.display()))?;

    let renderer = Renderer::new(&config);
    let html = renderer.render(&source)?;

    if json {
        let payload = serde_json::json!({
            "file": file.display().to_string(),
            "html": html,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{html}");
    }
    Ok(())
}

pub async fn strip_note(file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read note {}", file.display()))?;
    let text = strip(&source).await?;
    println!("{text}");
    Ok(())
}

pub fn init_project(path: Option<&Path>) -> Result<()> {
    let dir = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create project dir {}", dir.display()))?;

    let config_path = dir.join("notemark.yml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }
    fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Wrote {}", config_path.display());
    Ok(())
}
