//! `quill render` command implementation.

use clap::Args;
use quill_renderer::{MarkdownRenderer, RenderOptions};

use super::DocumentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    document: DocumentArgs,

    /// Keep single newlines as soft breaks.
    #[arg(long)]
    no_hard_breaks: bool,

    /// Leave quotes and dashes as typed.
    #[arg(long)]
    no_smart_punctuation: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let options = RenderOptions {
            hard_breaks: !self.no_hard_breaks,
            smart_punctuation: !self.no_smart_punctuation,
        };
        let document = self.document.load()?;

        let renderer = MarkdownRenderer::new(document.store()).with_options(options);
        let result = renderer.render(&document.text);

        for warning in &result.warnings {
            output.warning(&format!("{}: {warning}", document.path));
        }
        if let Some(title) = &result.title {
            output.info(&format!("Rendered \"{title}\""));
        }

        output.emit(&result.html)?;
        Ok(())
    }
}
