//! Frontmatter records and document metadata for Quill.
//!
//! This crate provides:
//! - [`Frontmatter`]: the YAML record extracted from the top of a document
//! - [`Frontmatter::validate`]: strict schema checks with defaults
//! - [`resolve`]: slug, date and social-tag resolution into [`DocumentMetadata`]
//!
//! Extraction itself (finding the block and caching the parsed record) is
//! done by `quill-renderer` during a render pass.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use quill_meta::{DocumentSource, Frontmatter, SiteDefaults, resolve};
//!
//! let fm = Frontmatter::from_yaml("title: Intro\ndescription: Start here\n").unwrap();
//! let source = DocumentSource {
//!     path: "guides/intro.md",
//!     modified: Utc::now(),
//!     external: false,
//! };
//!
//! let meta = resolve(Some(fm), &source, &SiteDefaults::default()).unwrap();
//! assert_eq!(meta.slug, "/docs/guides/intro");
//! assert_eq!(meta.excerpt, "Start here");
//! ```

mod date;
mod error;
mod frontmatter;
mod resolve;

pub use error::MetadataError;
pub use frontmatter::{
    CacheOptions, CacheSetting, DEFAULT_LAYOUT, Frontmatter, Redirect, SchemaViolation,
    SeoOverrides,
};
pub use resolve::{DocumentMetadata, DocumentSource, PageMeta, SiteDefaults, resolve};
