//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary. Autoescaping is off since
//! rendered block HTML is inserted as-is; templates escape user text with
//! the `escape` filter.

mod views;

pub use views::Views;

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer; `date_format` is the chrono format used by the
    /// `date_format` filter
    pub fn new(date_format: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("blog_index.html", include_str!("site/blog_index.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("page.html", include_str!("site/page.html")),
            ("careers.html", include_str!("site/careers.html")),
            ("contact.html", include_str!("site/contact.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_xml", date_xml_filter);

        let format = date_format.to_string();
        tera.register_filter(
            "date_format",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let s = tera::try_get_value!("date_format", "value", String, value);
                Ok(tera::Value::String(helpers::display_date(&s, &format)))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };
    Ok(tera::Value::String(helpers::truncate(&s, length, Some(&omission))))
}

/// Tera filter: ISO date for `<time datetime>`
fn date_xml_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_xml", "value", String, value);
    Ok(tera::Value::String(helpers::date_xml(&s)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub url: String,
    pub year: String,
    pub generator: String,
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoData {
    /// Full `<title>`, e.g. `Launch Day — BitFtx`
    pub title: String,
    pub description: String,
    /// Canonical URL, attribute-escaped
    pub url: String,
    /// Rendered Open Graph meta tags
    pub open_graph: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub path: String,
    pub title: String,
    pub excerpt: Option<String>,
    /// ISO-8601; formatted in templates
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobData {
    pub id: String,
    pub title: String,
    pub dept: String,
    /// Location, kind, and work mode, when set
    pub meta: Vec<String>,
    pub summary: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub posted: Option<String>,
    /// Pre-filled application mailto
    pub apply: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactData {
    pub title: String,
    pub summary: String,
    pub cta: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotFoundData {
    pub heading: String,
    pub message: String,
    pub back_path: String,
    pub back_label: String,
}
