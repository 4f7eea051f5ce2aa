//! `quill meta` command implementation.

use chrono::Utc;
use clap::Args;
use quill_renderer::PageRenderer;

use super::DocumentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the meta command.
#[derive(Args)]
pub(crate) struct MetaArgs {
    #[command(flatten)]
    document: DocumentArgs,

    /// Treat the document as synthetic content and skip schema validation.
    #[arg(long)]
    external: bool,
}

impl MetaArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let external = self.external;
        let document = self.document.load()?;

        let renderer = PageRenderer::new(document.store(), document.site_defaults());
        let metadata = renderer.metadata(&document.source(external), &document.text)?;

        if !metadata.is_published(Utc::now()) {
            output.warning(&format!("{} is not published", document.path));
        }

        output.emit(&serde_json::to_string_pretty(&metadata)?)?;
        Ok(())
    }
}
