//! In-memory content source for tests
//!
//! Mimics the remote API closely enough to exercise pagination, filter
//! rejection for unknown properties, and child listings.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{CmsError, ContentSource, Listing, PageRecord, Query, RawBlock};

#[derive(Default)]
pub struct MemorySource {
    pub properties: Vec<String>,
    /// Properties present on rows that the source refuses to filter or sort by
    pub rejected: Vec<String>,
    pub records: Vec<PageRecord>,
    pub children: HashMap<String, Vec<RawBlock>>,
    pub page_size: usize,
    /// When set, `database_properties` fails as if the integration lacked access
    pub hide_schema: bool,
    pub queries: Mutex<Vec<Query>>,
    pub child_calls: AtomicUsize,
    /// Latency of child listings, per parent block
    pub delays: HashMap<String, Duration>,
    /// Child listings currently running, and the most seen at once
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MemorySource {
    pub fn new(properties: &[&str]) -> Self {
        Self {
            properties: properties.iter().map(|s| s.to_string()).collect(),
            page_size: 2,
            ..Self::default()
        }
    }

    pub fn with_record(mut self, record: PageRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_children(mut self, parent: &str, blocks: Vec<RawBlock>) -> Self {
        self.children.insert(parent.to_string(), blocks);
        self
    }

    pub fn with_delay(mut self, parent: &str, delay: Duration) -> Self {
        self.delays.insert(parent.to_string(), delay);
        self
    }

    pub fn recorded_queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    fn validation_error(property: &str) -> CmsError {
        CmsError::Api {
            status: 400,
            code: "validation_error".to_string(),
            message: format!("Could not find property with name or id: {}", property),
        }
    }

    fn paginate<T: Clone>(&self, items: &[T], cursor: Option<&str>) -> Listing<T> {
        let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size.max(1)).min(items.len());
        let has_more = end < items.len();
        Listing {
            results: items[start.min(end)..end].to_vec(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        }
    }
}

fn checkbox(record: &PageRecord, property: &str) -> bool {
    record
        .properties
        .get(property)
        .and_then(|p| p.get("checkbox"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn date_start(record: &PageRecord, property: &str) -> String {
    record
        .properties
        .get(property)
        .and_then(|p| p.pointer("/date/start"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn database_properties(&self) -> Result<Vec<String>, CmsError> {
        if self.hide_schema {
            return Err(CmsError::Api {
                status: 403,
                code: "restricted_resource".to_string(),
                message: "Insufficient permissions".to_string(),
            });
        }
        Ok(self.properties.clone())
    }

    async fn query(&self, query: &Query) -> Result<Listing<PageRecord>, CmsError> {
        self.queries.lock().unwrap().push(query.clone());

        for property in query.referenced_properties() {
            let known = self.properties.iter().any(|p| p == property);
            if !known || self.rejected.iter().any(|p| p == property) {
                return Err(Self::validation_error(property));
            }
        }

        let mut rows: Vec<PageRecord> = self
            .records
            .iter()
            .filter(|r| {
                query
                    .filter
                    .as_ref()
                    .map_or(true, |f| checkbox(r, &f.property) == f.equals)
            })
            .cloned()
            .collect();

        if let Some(sort) = query.sorts.first() {
            rows.sort_by(|a, b| date_start(b, &sort.property).cmp(&date_start(a, &sort.property)));
        }

        Ok(self.paginate(&rows, query.start_cursor.as_deref()))
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Listing<RawBlock>, CmsError> {
        self.child_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(block_id) {
            tokio::time::sleep(*delay).await;
        }
        // Yield so concurrent callers overlap even without a delay
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.children.get(block_id) {
            Some(blocks) => Ok(self.paginate(blocks, cursor)),
            None => Err(CmsError::Api {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("Could not find block with ID: {}", block_id),
            }),
        }
    }
}

/// A database row with the given property bag
pub fn record(id: &str, properties: Value) -> PageRecord {
    serde_json::from_value(json!({
        "id": id,
        "url": format!("https://www.notion.so/{}", id.replace('-', "")),
        "created_time": "2025-01-01T00:00:00.000Z",
        "properties": properties,
    }))
    .unwrap()
}

/// A block of `kind` with the given payload
pub fn block(id: &str, kind: &str, has_children: bool, payload: Value) -> RawBlock {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": kind,
        "has_children": has_children,
        kind: payload,
    }))
    .unwrap()
}

/// Rich text array with a single unannotated span
pub fn text(content: &str) -> Value {
    json!([{
        "type": "text",
        "text": { "content": content, "link": null },
        "annotations": {
            "bold": false, "italic": false, "strikethrough": false,
            "underline": false, "code": false, "color": "default"
        },
        "plain_text": content,
        "href": null
    }])
}

/// Paragraph block with plain text
pub fn paragraph(id: &str, content: &str) -> RawBlock {
    block(id, "paragraph", false, json!({ "rich_text": text(content) }))
}
