//! bitftx-site: the BitFtx marketing site
//!
//! Blog posts live in a Notion database and are rendered from their block
//! trees; static pages are markdown files in the source directory. The site
//! is either generated to static files or served live with a revalidating
//! in-memory cache.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{NotionClient, SharedSource};
use content::Blog;

/// The site: configuration and the directories it works in
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory for static pages and assets
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        }
    }

    /// Notion client built from configuration and the environment
    pub fn content_source(&self) -> Result<SharedSource> {
        let client = NotionClient::new(&self.config.cms)?;
        Ok(Arc::new(client))
    }

    /// Blog service over the given source
    pub fn blog(&self, source: SharedSource) -> Blog {
        Blog::new(source, &self.config.cms)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
