//! `quill toc` command implementation.

use clap::Args;
use quill_renderer::{MarkdownRenderer, TocEntry};
use quill_toc::{HeadingElement, HeadingKey, Hierarchy, TocConfig, TocNav};
use serde_json::json;

use super::DocumentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    #[command(flatten)]
    document: DocumentArgs,
}

impl TocArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let document = self.document.load()?;
        let result = MarkdownRenderer::new(document.store()).render(&document.text);

        let headings = heading_elements(&result.toc);
        if headings.is_empty() {
            output.warning(&format!("{}: no headings found", document.path));
        }
        let nav = TocNav::build(&Hierarchy::build(&headings));

        let controller = controller_config(&document.config.toc);
        let report = json!({
            "debounceMs": u64::try_from(controller.debounce.as_millis()).unwrap_or(u64::MAX),
            "scrollMargin": controller.scroll_margin,
            "entries": result.toc,
            "html": nav.render_html(),
        });
        output.emit(&serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }
}

/// Controller settings from the `[toc]` config section.
fn controller_config(toc: &quill_config::TocConfig) -> TocConfig {
    TocConfig {
        debounce: toc.debounce(),
        scroll_margin: toc.scroll_margin,
    }
}

/// Page headings the TOC is built from; the level 1 page title is skipped.
fn heading_elements(entries: &[TocEntry]) -> Vec<HeadingElement> {
    entries
        .iter()
        .filter(|entry| entry.level >= 2)
        .enumerate()
        .map(|(index, entry)| HeadingElement {
            key: HeadingKey(index),
            level: entry.level,
            text: entry.title.clone(),
            id: entry.id.clone(),
            inner_html: entry.inner_html.clone(),
            omit_attr: entry.omit_toc,
        })
        .collect()
}
