//! Renderer error types.

use quill_meta::MetadataError;

/// Error registering a rule in a [`BlockRuler`](crate::BlockRuler).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RulerError {
    #[error("No block rule named \"{0}\"")]
    UnknownAnchor(String),

    #[error("Block rule \"{0}\" is already registered")]
    DuplicateName(String),
}

/// Error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
