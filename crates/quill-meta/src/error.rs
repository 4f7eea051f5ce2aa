//! Metadata error types.

use crate::SchemaViolation;

/// Error type for metadata operations.
///
/// Every variant that concerns a specific document names it, so a failure
/// can be reported against that document alone.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),

    /// The document has no frontmatter block (or it failed to parse).
    #[error("No frontmatter found in {document}")]
    MissingFrontmatter {
        /// Document identity, e.g. `docs/guides/intro.md`.
        document: String,
    },

    /// The frontmatter broke a schema rule.
    #[error("Invalid frontmatter in {document}: {violation}")]
    Validation {
        /// Document identity, e.g. `docs/guides/intro.md`.
        document: String,
        /// Field-level cause.
        violation: SchemaViolation,
    },
}

impl MetadataError {
    /// Identity of the document the error concerns, if any.
    #[must_use]
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Parse(_) => None,
            Self::MissingFrontmatter { document } | Self::Validation { document, .. } => {
                Some(document)
            }
        }
    }
}
