//! Print the OpenAPI document for the learning platform API.
//!
//! Frontend clients are generated from this output, so it must match what
//! the server serves at `/api-docs/openapi.json`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use learning_backend::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "openapi-dump",
    about = "Write the REST API's OpenAPI document as JSON",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit a single line instead of indented JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let document = render(args.compact)?;
    match args.output {
        Some(path) => fs::write(&path, document)
            .with_context(|| format!("failed to write OpenAPI document to {}", path.display())),
        None => io::stdout()
            .lock()
            .write_all(document.as_bytes())
            .context("failed to write OpenAPI document to stdout"),
    }
}

fn render(compact: bool) -> Result<String> {
    let doc = ApiDoc::openapi();
    let mut json = if compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .context("failed to serialise the OpenAPI document")?;
    json.push('\n');
    Ok(json)
}
