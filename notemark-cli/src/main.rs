//! # notemark CLI
//!
//! Command-line interface for the notemark note renderer.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "notemark.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown note to HTML
    Render {
        /// Note file to render
        file: PathBuf,

        /// Emit a JSON object instead of raw HTML
        #[arg(long)]
        json: bool,
    },

    /// Strip Markdown formatting, producing plain text
    Strip {
        /// Note file to strip
        file: PathBuf,
    },

    /// Write a starter configuration file
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Render { file, json } => commands::render_note(&cli.config, &file, json),
        Commands::Strip { file } => commands::strip_note(&file).await,
        Commands::Init { path } => commands::init_project(path.as_deref()),
    }
}
