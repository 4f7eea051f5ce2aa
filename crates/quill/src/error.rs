//! CLI error types.

use quill_config::ConfigError;
use quill_renderer::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}
