//! Document metadata resolution.
//!
//! Turns a cached [`Frontmatter`] record plus facts about the source file into
//! the [`DocumentMetadata`] handed to templates and the serving layer:
//!
//! - `slug`: `{url_prefix}/{path without .md}`, with the file name replaced by
//!   the frontmatter `slug` when one is set
//! - `excerpt`: falls back to `description`
//! - `sort`: falls back to `0`
//! - `updated_at`: the later of the file modification time and `publishedAt`
//! - social/SEO tags: per-page overrides, then page fields, then site defaults

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CacheSetting, Frontmatter, MetadataError, Redirect};

/// Site-wide fallbacks used while resolving metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteDefaults {
    /// Prefix joined in front of every slug.
    pub url_prefix: String,
    pub site_name: String,
    pub locale: String,
    /// Twitter handle credited as creator when a page sets none.
    pub twitter_creator: Option<String>,
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            url_prefix: "/docs".to_owned(),
            site_name: "Quill".to_owned(),
            locale: "en_US".to_owned(),
            twitter_creator: None,
        }
    }
}

/// Facts about the document being resolved.
#[derive(Clone, Copy, Debug)]
pub struct DocumentSource<'a> {
    /// Path relative to the docs root, e.g. `guides/intro.md`.
    pub path: &'a str,
    /// File modification time.
    pub modified: DateTime<Utc>,
    /// Synthetic content not backed by a docs file; skips schema validation.
    pub external: bool,
}

impl DocumentSource<'_> {
    /// Identity used in error messages.
    #[must_use]
    pub fn identity(&self) -> String {
        format!("docs/{}", self.path)
    }
}

/// Fully resolved metadata for one document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub excerpt: String,
    pub sort: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub http_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
    pub meta: PageMeta,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Social and SEO tags with every fallback applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub fb_title: String,
    pub fb_description: String,
    pub fb_image: Option<String>,
    pub fb_type: String,
    pub fb_locale: String,
    pub fb_site_name: String,
    pub tw_title: String,
    pub tw_description: String,
    pub tw_image: Option<String>,
    pub tw_author: Option<String>,
    pub tw_card: String,
    pub tw_site: String,
    pub tw_creator: Option<String>,
    pub keywords: Vec<String>,
    pub canonical: String,
    pub robots: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl DocumentMetadata {
    /// Whether the document may be served at `now`.
    ///
    /// Hidden when `published` is explicitly `false` or `publishedAt` lies in
    /// the future.
    #[must_use]
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        if self.published == Some(false) {
            return false;
        }
        self.published_at.is_none_or(|at| at <= now)
    }
}

/// Resolve metadata for a document.
///
/// `frontmatter` is the record previously extracted while rendering the
/// document; `None` means no block was found.
///
/// # Errors
///
/// - [`MetadataError::MissingFrontmatter`] if `frontmatter` is `None`
/// - [`MetadataError::Validation`] if the record breaks the schema and the
///   source is not external
pub fn resolve(
    frontmatter: Option<Frontmatter>,
    source: &DocumentSource<'_>,
    defaults: &SiteDefaults,
) -> Result<DocumentMetadata, MetadataError> {
    let frontmatter = frontmatter.ok_or_else(|| MetadataError::MissingFrontmatter {
        document: source.identity(),
    })?;

    let fm = if source.external {
        frontmatter
    } else {
        frontmatter
            .validate()
            .map_err(|violation| MetadataError::Validation {
                document: source.identity(),
                violation,
            })?
    };

    let slug = build_slug(source.path, fm.slug.as_deref(), &defaults.url_prefix);
    let title = fm.title.unwrap_or_default();
    let description = fm.description.unwrap_or_default();
    let updated_at = match fm.published_at {
        Some(published) if published > source.modified => published,
        _ => source.modified,
    };

    let overrides = fm.meta.unwrap_or_default();
    let meta = PageMeta {
        fb_title: overrides.fb_title.unwrap_or_else(|| title.clone()),
        fb_description: overrides.fb_description.unwrap_or_else(|| description.clone()),
        fb_image: overrides.fb_image.or_else(|| fm.image.clone()),
        fb_type: overrides.fb_type.unwrap_or_else(|| "website".to_owned()),
        fb_locale: overrides.fb_locale.unwrap_or_else(|| defaults.locale.clone()),
        fb_site_name: overrides
            .fb_site_name
            .unwrap_or_else(|| defaults.site_name.clone()),
        tw_title: overrides.tw_title.unwrap_or_else(|| title.clone()),
        tw_description: overrides.tw_description.unwrap_or_else(|| description.clone()),
        tw_image: overrides.tw_image.or_else(|| fm.image.clone()),
        tw_author: overrides.tw_author.or_else(|| fm.author.clone()),
        tw_card: overrides
            .tw_card
            .unwrap_or_else(|| "summary_large_image".to_owned()),
        tw_site: overrides.tw_site.unwrap_or_else(|| defaults.site_name.clone()),
        tw_creator: overrides
            .tw_creator
            .or_else(|| defaults.twitter_creator.clone()),
        keywords: overrides.keywords.unwrap_or_default(),
        canonical: overrides.canonical.unwrap_or_else(|| slug.clone()),
        robots: overrides.robots.unwrap_or_else(|| "index, follow".to_owned()),
        structured_data: overrides.structured_data,
    };

    tracing::debug!(document = %source.identity(), %slug, "resolved metadata");

    Ok(DocumentMetadata {
        excerpt: fm.excerpt.unwrap_or_else(|| description.clone()),
        sort: fm.sort.unwrap_or(0),
        title,
        description,
        slug,
        image: fm.image,
        author: fm.author,
        published: fm.published,
        published_at: fm.published_at,
        updated_at,
        tags: fm.tags,
        layout: fm.layout,
        http_headers: fm.http_headers,
        cache: fm.cache,
        redirect: fm.redirect,
        meta,
        extra: fm.extra,
    })
}

/// Build the URL slug for a docs-relative path.
fn build_slug(path: &str, custom: Option<&str>, prefix: &str) -> String {
    let stem = path.strip_suffix(".md").unwrap_or(path);
    let relative = match custom {
        Some(custom) => match stem.rfind('/') {
            Some(idx) => format!("{}/{custom}", &stem[..idx]),
            None => custom.to_owned(),
        },
        None => stem.to_owned(),
    };
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}
