//! Database query model
//!
//! Only the subset the blog needs: an equality filter on a checkbox
//! property and descending property sorts.

use serde_json::{json, Value};

/// Equality filter on a checkbox property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub property: String,
    pub equals: bool,
}

impl Filter {
    pub fn checkbox(property: &str, equals: bool) -> Self {
        Self {
            property: property.to_string(),
            equals,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "property": self.property,
            "checkbox": { "equals": self.equals },
        })
    }
}

/// Newest-first sort on a date property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
}

impl Sort {
    pub fn descending(property: &str) -> Self {
        Self {
            property: property.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "property": self.property,
            "direction": "descending",
        })
    }
}

/// One database query: optional filter, sorts, and the cursor of the page
/// to fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
    pub start_cursor: Option<String>,
}

impl Query {
    pub fn new(filter: Option<Filter>, sorts: Vec<Sort>) -> Self {
        Self {
            filter,
            sorts,
            start_cursor: None,
        }
    }

    /// Same query, continuing at `cursor`
    pub fn at(&self, cursor: Option<String>) -> Self {
        Self {
            start_cursor: cursor,
            ..self.clone()
        }
    }

    /// Property names the query refers to
    pub fn referenced_properties(&self) -> Vec<&str> {
        self.filter
            .iter()
            .map(|f| f.property.as_str())
            .chain(self.sorts.iter().map(|s| s.property.as_str()))
            .collect()
    }

    /// Request body for the query endpoint
    pub fn to_body(&self, page_size: u32) -> Value {
        let mut body = json!({ "page_size": page_size });
        if let Some(filter) = &self.filter {
            body["filter"] = filter.to_json();
        }
        if !self.sorts.is_empty() {
            body["sorts"] = Value::Array(self.sorts.iter().map(Sort::to_json).collect());
        }
        if let Some(cursor) = &self.start_cursor {
            body["start_cursor"] = Value::String(cursor.clone());
        }
        body
    }
}
