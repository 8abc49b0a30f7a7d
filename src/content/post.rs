//! Post summaries and static page models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use super::properties;
use crate::cms::PageRecord;
use crate::config::FieldMap;

/// A published blog post as listed in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Opaque page id in the content source
    pub id: String,

    /// URL-safe slug, unique within the published set
    pub slug: String,

    pub title: String,

    pub excerpt: Option<String>,

    /// Publish date as ISO-8601 (date or date-time)
    pub date: Option<String>,

    pub tags: Vec<String>,

    pub author: Option<String>,

    pub cover: Option<String>,

    /// Page URL in the workspace
    pub url: String,
}

/// A row decoded from the posts database, before filtering
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub summary: PostSummary,
    pub published: bool,
    pub created_time: Option<String>,
}

impl PostRecord {
    /// Decode a database row using the resolved field names
    pub fn from_page(page: &PageRecord, fields: &FieldMap) -> Self {
        let props = &page.properties;

        let title = properties::text(props, &fields.title);
        let title = if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        };

        let excerpt = Some(properties::text(props, &fields.excerpt)).filter(|e| !e.is_empty());

        // The page cover wins over a cover property
        let cover = page
            .cover
            .as_ref()
            .and_then(|c| c.url())
            .map(str::to_string)
            .or_else(|| properties::file_url(props, &fields.cover));

        let summary = PostSummary {
            id: page.id.clone(),
            slug: properties::text(props, &fields.slug),
            title,
            excerpt,
            date: properties::date(props, &fields.date),
            tags: properties::tags(props, &fields.tags),
            author: properties::person(props, &fields.author),
            cover,
            url: page.url.clone(),
        };

        Self {
            summary,
            published: properties::checkbox(props, &fields.published),
            created_time: page.created_time.clone(),
        }
    }
}

/// Parse an ISO-8601 date or date-time into UTC
pub fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl PostSummary {
    /// Publish date, if present and parseable
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_iso_date)
    }

    /// Order newest first; posts without a date sort last
    pub fn newest_first(a: &PostSummary, b: &PostSummary) -> Ordering {
        match (a.published_at(), b.published_at()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// A standalone page written in markdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Meta description
    pub description: Option<String>,

    /// Rendered HTML content
    pub content: String,

    /// Template to render the page with
    pub layout: String,

    /// Source file path (relative)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// URL path (without root), e.g. `about/`
    pub path: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            description: None,
            content: String::new(),
            layout: "page".to_string(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            path: String::new(),
            extra: HashMap::new(),
        }
    }
}
