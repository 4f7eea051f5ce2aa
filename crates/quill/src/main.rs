//! Quill CLI.
//!
//! Provides commands for:
//! - `render`: Render a markdown document to HTML
//! - `meta`: Print a document's resolved metadata as JSON
//! - `toc`: Print the table of contents for a document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MetaArgs, RenderArgs, TocArgs};
use output::Output;

/// Quill - markdown documentation renderer.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Log at INFO level (otherwise RUST_LOG decides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown document to HTML.
    Render(RenderArgs),
    /// Print resolved document metadata as JSON.
    Meta(MetaArgs),
    /// Print the table of contents as JSON.
    Toc(TocArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Meta(args) => args.execute(&output),
        Commands::Toc(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
