//! Page rendering with resolved metadata.

use std::sync::Arc;

use quill_meta::{DocumentMetadata, DocumentSource, SiteDefaults, resolve};

use crate::error::RenderError;
use crate::frontmatter::FrontmatterStore;
use crate::renderer::{MarkdownRenderer, RenderOptions};
use crate::state::TocEntry;

/// A rendered page and its metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub html: String,
    pub title: Option<String>,
    pub toc: Vec<TocEntry>,
    pub warnings: Vec<String>,
    pub metadata: DocumentMetadata,
}

/// Renders documents and resolves their frontmatter into metadata.
#[derive(Debug)]
pub struct PageRenderer {
    renderer: MarkdownRenderer,
    store: Arc<FrontmatterStore>,
    defaults: SiteDefaults,
}

impl PageRenderer {
    #[must_use]
    pub fn new(store: Arc<FrontmatterStore>, defaults: SiteDefaults) -> Self {
        Self {
            renderer: MarkdownRenderer::new(Arc::clone(&store)),
            store,
            defaults,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.renderer = self.renderer.with_options(options);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<FrontmatterStore> {
        &self.store
    }

    /// Render `text` and resolve its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Metadata`] if the document has no usable
    /// frontmatter or it fails validation.
    pub fn render_page(&self, source: &DocumentSource<'_>, text: &str) -> Result<Page, RenderError> {
        let result = self.renderer.render(text);
        let metadata = resolve(self.store.lookup(text), source, &self.defaults)?;

        Ok(Page {
            html: result.html,
            title: result.title,
            toc: result.toc,
            warnings: result.warnings,
            metadata,
        })
    }

    /// Metadata for `text`, rendering it first on a cache miss.
    ///
    /// # Errors
    ///
    /// Same as [`render_page`](Self::render_page).
    pub fn metadata(
        &self,
        source: &DocumentSource<'_>,
        text: &str,
    ) -> Result<DocumentMetadata, RenderError> {
        let frontmatter = match self.store.lookup(text) {
            Some(frontmatter) => Some(frontmatter),
            None => {
                tracing::debug!(path = source.path, "Frontmatter cache miss, rendering");
                let _ = self.renderer.render(text);
                self.store.lookup(text)
            }
        };
        Ok(resolve(frontmatter, source, &self.defaults)?)
    }
}
