//! Wire types returned by the content source

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Listing<T> {
    /// Cursor of the next page, if there is one
    pub fn continuation(&self) -> Option<String> {
        if self.has_more {
            self.next_cursor.clone()
        } else {
            None
        }
    }
}

/// A database row: page metadata plus its semi-structured property bag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub cover: Option<FileRef>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A hosted or external file reference (covers, images, videos, files)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub external: Option<UrlRef>,
    #[serde(default)]
    pub file: Option<UrlRef>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRef {
    pub url: String,
}

impl FileRef {
    pub fn external(url: &str) -> Self {
        Self {
            kind: "external".to_string(),
            external: Some(UrlRef {
                url: url.to_string(),
            }),
            ..Self::default()
        }
    }

    /// URL of the file; hosted file URLs are signed and expire
    pub fn url(&self) -> Option<&str> {
        let url = match self.kind.as_str() {
            "external" => self.external.as_ref(),
            "file" => self.file.as_ref(),
            _ => self.external.as_ref().or(self.file.as_ref()),
        };
        url.map(|u| u.url.as_str()).filter(|u| !u.is_empty())
    }
}

/// A block as listed by the source, before its payload is decoded.
///
/// The payload lives under a key named after the block type, e.g.
/// `{"type": "paragraph", "paragraph": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl RawBlock {
    /// Take the type-specific payload out of the block
    pub fn take_payload(&mut self) -> Value {
        self.rest.remove(&self.kind).unwrap_or(Value::Null)
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
