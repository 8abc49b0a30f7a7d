//! Typed reads from a database row's property bag
//!
//! Every reader takes the candidate names for one attribute and uses the
//! first one present on the row. A missing property, or one of an
//! unexpected type, yields the attribute's default.

use serde_json::{Map, Value};

use crate::cms::FileRef;

type Properties = Map<String, Value>;

/// First candidate property present on the row
pub fn pick<'a>(props: &'a Properties, candidates: &[String]) -> Option<&'a Value> {
    candidates.iter().find_map(|name| props.get(name))
}

fn property_type(prop: &Value) -> &str {
    prop.get("type").and_then(Value::as_str).unwrap_or_default()
}

/// Concatenated `plain_text` of a rich-text array
pub fn plain_text(spans: Option<&Value>) -> String {
    spans
        .and_then(Value::as_array)
        .map(|spans| {
            spans
                .iter()
                .filter_map(|s| s.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// Text of a `title`, `rich_text`, or `url` property, trimmed
pub fn text(props: &Properties, candidates: &[String]) -> String {
    let Some(prop) = pick(props, candidates) else {
        return String::new();
    };
    let text = match property_type(prop) {
        "title" => plain_text(prop.get("title")),
        "rich_text" => plain_text(prop.get("rich_text")),
        "url" => prop
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };
    text.trim().to_string()
}

/// Value of a `checkbox` property; `false` when absent
pub fn checkbox(props: &Properties, candidates: &[String]) -> bool {
    pick(props, candidates)
        .filter(|p| property_type(p) == "checkbox")
        .and_then(|p| p.get("checkbox"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Start of a `date` property as an ISO-8601 string
pub fn date(props: &Properties, candidates: &[String]) -> Option<String> {
    pick(props, candidates)
        .filter(|p| property_type(p) == "date")
        .and_then(|p| p.pointer("/date/start"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Names of a `multi_select` (or `select`) property, in order, deduplicated
pub fn tags(props: &Properties, candidates: &[String]) -> Vec<String> {
    let Some(prop) = pick(props, candidates) else {
        return Vec::new();
    };
    let options: Vec<&Value> = match property_type(prop) {
        "multi_select" => prop
            .get("multi_select")
            .and_then(Value::as_array)
            .map(|a| a.iter().collect())
            .unwrap_or_default(),
        "select" => prop.get("select").filter(|s| !s.is_null()).into_iter().collect(),
        _ => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::new();
    for name in options
        .into_iter()
        .filter_map(|o| o.get("name").and_then(Value::as_str))
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

/// First person's name of a `people` property, else `rich_text` text
pub fn person(props: &Properties, candidates: &[String]) -> Option<String> {
    let prop = pick(props, candidates)?;
    let name = match property_type(prop) {
        "people" => prop
            .pointer("/people/0/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        "rich_text" => plain_text(prop.get("rich_text")),
        _ => String::new(),
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// URL of the first file of a `files` property, or of a `url` property
pub fn file_url(props: &Properties, candidates: &[String]) -> Option<String> {
    let prop = pick(props, candidates)?;
    match property_type(prop) {
        "files" => prop
            .pointer("/files/0")
            .cloned()
            .and_then(|f| serde_json::from_value::<FileRef>(f).ok())
            .and_then(|f| f.url().map(str::to_string)),
        "url" => prop
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
