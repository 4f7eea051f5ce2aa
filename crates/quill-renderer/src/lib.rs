//! Markdown rendering for Quill.
//!
//! This crate turns markdown documents into HTML on top of pulldown-cmark,
//! with two block-level extensions:
//!
//! - **Embed directives**: single lines such as `[youtube <url> 640 360]`
//!   become embedded players and sandboxes (see [`embed`])
//! - **Frontmatter**: a leading `---` YAML block is hidden from the output and
//!   its parsed record cached in a [`FrontmatterStore`] keyed by document
//!   content
//!
//! Both are [`BlockRule`]s in an ordered [`BlockRuler`]; their output is
//! produced by a [`RendererRules`] table that callers may override.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quill_renderer::{FrontmatterStore, MarkdownRenderer};
//!
//! let store = Arc::new(FrontmatterStore::default());
//! let renderer = MarkdownRenderer::new(Arc::clone(&store));
//!
//! let text = "---\ntitle: Demo\n---\n## Video\n\n[youtube https://youtu.be/abc123]\n";
//! let result = renderer.render(text);
//!
//! assert!(result.html.contains("https://www.youtube.com/embed/abc123"));
//! assert_eq!(result.toc[0].id, "video");
//! assert_eq!(store.lookup(text).unwrap().title.as_deref(), Some("Demo"));
//! ```

mod block;
pub mod embed;
mod error;
mod fence;
mod frontmatter;
mod page;
mod renderer;
mod replacements;
mod rules;
mod state;

pub use block::{Block, BlockRule, BlockRuler, BlockState, FENCE, PARAGRAPH, Payload, Token};
pub use error::{RenderError, RulerError};
pub use frontmatter::{FRONTMATTER_KIND, FrontmatterRule, FrontmatterStore, content_key};
pub use page::{Page, PageRenderer};
pub use renderer::{MarkdownRenderer, RenderOptions, RenderResult};
pub use rules::{RenderFn, RendererRules};
pub use state::{TocEntry, escape_html, slugify};
