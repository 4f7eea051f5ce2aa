//! Frontmatter record and schema.
//!
//! A [`Frontmatter`] is the parsed YAML block at the top of a markdown
//! document. Parsing is permissive: every field is optional and unknown keys
//! are kept in [`Frontmatter::extra`]. Strict checks live in
//! [`Frontmatter::validate`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MetadataError;

/// Default page layout applied by [`Frontmatter::validate`].
pub const DEFAULT_LAYOUT: &str = "main";

/// Parsed frontmatter block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Absolute URL of the social preview image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Explicit `false` hides the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,

    /// Documents dated in the future are hidden until then.
    #[serde(
        default,
        deserialize_with = "crate::date::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "crate::date::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,

    /// Replaces the file name when building the URL slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub http_headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSetting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SeoOverrides>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,

    /// Keys not covered by the schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Response caching hint for the serving layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSetting {
    Enabled(bool),
    Options(CacheOptions),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<String>,
}

/// Per-page overrides for social and SEO tags.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOverrides {
    pub fb_title: Option<String>,
    pub fb_description: Option<String>,
    pub fb_image: Option<String>,
    pub fb_type: Option<String>,
    pub fb_locale: Option<String>,
    pub fb_site_name: Option<String>,
    pub tw_title: Option<String>,
    pub tw_description: Option<String>,
    pub tw_image: Option<String>,
    pub tw_author: Option<String>,
    pub tw_card: Option<String>,
    pub tw_site: Option<String>,
    pub tw_creator: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub canonical: Option<String>,
    pub robots: Option<String>,
    pub structured_data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Redirect instruction; `to` is required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: String,
    #[serde(default)]
    pub permanent: bool,
}

/// A single schema rule that a frontmatter record broke.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("\"{field}\" {message}")]
pub struct SchemaViolation {
    /// Offending field, in frontmatter spelling.
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl Frontmatter {
    /// Parse a YAML payload.
    ///
    /// Empty content yields a default record.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Parse`] if the YAML is malformed or a field
    /// has the wrong type.
    pub fn from_yaml(content: &str) -> Result<Self, MetadataError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(trimmed).map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))
    }

    /// Check the strict schema and apply defaults.
    ///
    /// Required: non-empty `title` and `description`. `image` must be an
    /// absolute URL. `redirect.to` must be non-empty. `layout` defaults to
    /// [`DEFAULT_LAYOUT`].
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found.
    pub fn validate(mut self) -> Result<Self, SchemaViolation> {
        require_text(self.title.as_deref(), "title")?;
        require_text(self.description.as_deref(), "description")?;

        if let Some(image) = &self.image
            && url::Url::parse(image).is_err()
        {
            return Err(SchemaViolation::new("image", "must be a valid uri"));
        }

        if let Some(redirect) = &self.redirect
            && redirect.to.trim().is_empty()
        {
            return Err(SchemaViolation::new("redirect.to", "is not allowed to be empty"));
        }

        if self.layout.is_none() {
            self.layout = Some(DEFAULT_LAYOUT.to_owned());
        }

        Ok(self)
    }
}

fn require_text(value: Option<&str>, field: &str) -> Result<(), SchemaViolation> {
    match value {
        None => Err(SchemaViolation::new(field, "is required")),
        Some(s) if s.trim().is_empty() => {
            Err(SchemaViolation::new(field, "is not allowed to be empty"))
        }
        Some(_) => Ok(()),
    }
}
