//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::FieldMap;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub blog_dir: String,

    // Date display (chrono format)
    pub date_format: String,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,

    // Static lists rendered by the careers and contact pages
    #[serde(default)]
    pub contacts: Vec<ContactChannel>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    pub careers_email: String,
    pub security_email: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "BitFtx".to_string(),
            description: "Crypto prediction markets.".to_string(),
            language: "en".to_string(),

            url: "https://bitftx.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            blog_dir: "blog".to_string(),

            date_format: "%b %-d, %Y".to_string(),

            cms: CmsConfig::default(),

            contacts: Vec::new(),
            jobs: Vec::new(),
            careers_email: "hr@bitftx.com".to_string(),
            security_email: "security@bitftx.com".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Connection settings for the Notion workspace that backs the blog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub api_base: String,
    pub api_version: String,
    /// Database holding the posts; falls back to the environment when unset
    pub database_id: Option<String>,
    /// Environment variable carrying the integration token
    pub token_env: String,
    pub page_size: u32,
    /// Seconds before a fetched index or post body is considered stale
    pub revalidate_secs: u64,
    /// Upper bound on concurrent child-block requests
    pub fetch_concurrency: usize,
    pub max_retries: u32,
    #[serde(default)]
    pub fields: FieldMap,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            database_id: None,
            token_env: "NOTION_TOKEN".to_string(),
            page_size: 50,
            revalidate_secs: 300,
            fetch_concurrency: 8,
            max_retries: 3,
            fields: FieldMap::default(),
        }
    }
}

impl CmsConfig {
    /// Environment variables consulted, in order, when `database_id` is unset
    pub const DATABASE_ENV: [&'static str; 3] =
        ["NOTION_BLOG_DB", "NOTION_DB_ID", "NOTION_DATABASE_ID"];

    /// The API accepts page sizes between 1 and 100
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }

    /// Resolve the database id from config, then the environment
    pub fn database_id(&self) -> Option<String> {
        self.database_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| {
                Self::DATABASE_ENV
                    .iter()
                    .filter_map(|key| std::env::var(key).ok())
                    .find(|id| !id.trim().is_empty())
            })
    }
}

/// A contact channel listed on the contact page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactChannel {
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cta: Option<String>,
}

/// An open role listed on the careers page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub dept: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    /// ISO date the role was posted
    #[serde(default)]
    pub posted: Option<String>,
}
