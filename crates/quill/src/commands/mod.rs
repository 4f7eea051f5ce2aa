//! CLI command implementations.

mod meta;
mod render;
mod toc;

pub(crate) use meta::MetaArgs;
pub(crate) use render::RenderArgs;
pub(crate) use toc::TocArgs;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Args;
use quill_cache::CachePolicy;
use quill_config::{CliSettings, Config};
use quill_meta::{DocumentSource, SiteDefaults};
use quill_renderer::FrontmatterStore;

use crate::error::CliError;

/// Arguments shared by every command that reads one document.
#[derive(Args)]
pub(crate) struct DocumentArgs {
    /// Markdown file to process.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Slug prefix for document URLs (overrides config).
    #[arg(long)]
    url_prefix: Option<String>,
}

/// A document read from disk with the configuration it is rendered under.
pub(crate) struct Document {
    pub config: Config,
    /// Path relative to the docs root, `/`-separated.
    pub path: String,
    pub modified: DateTime<Utc>,
    pub text: String,
}

impl DocumentArgs {
    pub(crate) fn load(self) -> Result<Document, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            url_prefix: self.url_prefix,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let text = std::fs::read_to_string(&self.file)?;
        let modified = std::fs::metadata(&self.file)?.modified()?.into();
        let path = docs_relative(&self.file, &config.docs_resolved.source_dir);
        tracing::debug!(file = %self.file.display(), path = %path, "Loaded document");

        Ok(Document {
            config,
            path,
            modified,
            text,
        })
    }
}

impl Document {
    pub(crate) fn source(&self, external: bool) -> DocumentSource<'_> {
        DocumentSource {
            path: &self.path,
            modified: self.modified,
            external,
        }
    }

    pub(crate) fn store(&self) -> Arc<FrontmatterStore> {
        let cache = &self.config.cache;
        Arc::new(FrontmatterStore::new(CachePolicy::new(
            cache.ttl(),
            cache.max_entries,
        )))
    }

    pub(crate) fn site_defaults(&self) -> SiteDefaults {
        let site = &self.config.site;
        SiteDefaults {
            url_prefix: self.config.url_prefix().to_owned(),
            site_name: site.name.clone(),
            locale: site.locale.clone(),
            twitter_creator: site.twitter_creator.clone(),
        }
    }
}

/// Path of `file` below `root`, or its file name when it lives elsewhere.
fn docs_relative(file: &Path, root: &Path) -> String {
    let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    match file.strip_prefix(&root) {
        Ok(relative) => relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
