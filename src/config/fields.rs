//! Mapping from logical post attributes to database property names
//!
//! Databases in the wild name their columns differently ("Title" vs
//! "title", "PublishedAt" vs "Date"). Each logical attribute carries an
//! ordered list of candidate names; [`FieldMap::resolve`] narrows every list
//! to the single name the database actually has, once, so extraction and
//! query building never have to guess again.

use serde::{Deserialize, Serialize};

/// A logical attribute of a post summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Title,
    Slug,
    Published,
    Date,
    Excerpt,
    Tags,
    Author,
    Cover,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Title,
        Attribute::Slug,
        Attribute::Published,
        Attribute::Date,
        Attribute::Excerpt,
        Attribute::Tags,
        Attribute::Author,
        Attribute::Cover,
    ];
}

/// Candidate property names per attribute, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub title: Vec<String>,
    pub slug: Vec<String>,
    pub published: Vec<String>,
    pub date: Vec<String>,
    pub excerpt: Vec<String>,
    pub tags: Vec<String>,
    pub author: Vec<String>,
    pub cover: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            title: names(&["Title", "title", "Name"]),
            slug: names(&["Slug", "slug"]),
            published: names(&["Published", "published"]),
            date: names(&["PublishedAt", "Publish_Date", "publish_date", "Date"]),
            excerpt: names(&["Excerpt", "excerpt", "Preview", "preview"]),
            tags: names(&["Tags", "tags"]),
            author: names(&["Author", "author"]),
            cover: names(&["Cover", "cover", "Hero", "hero"]),
        }
    }
}

impl FieldMap {
    /// Candidate names for an attribute
    pub fn candidates(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::Title => &self.title,
            Attribute::Slug => &self.slug,
            Attribute::Published => &self.published,
            Attribute::Date => &self.date,
            Attribute::Excerpt => &self.excerpt,
            Attribute::Tags => &self.tags,
            Attribute::Author => &self.author,
            Attribute::Cover => &self.cover,
        }
    }

    fn candidates_mut(&mut self, attribute: Attribute) -> &mut Vec<String> {
        match attribute {
            Attribute::Title => &mut self.title,
            Attribute::Slug => &mut self.slug,
            Attribute::Published => &mut self.published,
            Attribute::Date => &mut self.date,
            Attribute::Excerpt => &mut self.excerpt,
            Attribute::Tags => &mut self.tags,
            Attribute::Author => &mut self.author,
            Attribute::Cover => &mut self.cover,
        }
    }

    /// Narrow every attribute to the first candidate present in `available`.
    ///
    /// An attribute with no match resolves to an empty list and takes its
    /// default value during extraction.
    pub fn resolve<S: AsRef<str>>(&self, available: &[S]) -> FieldMap {
        let mut resolved = self.clone();
        for attribute in Attribute::ALL {
            let hit = self
                .candidates(attribute)
                .iter()
                .find(|name| available.iter().any(|a| a.as_ref() == name.as_str()))
                .cloned();
            *resolved.candidates_mut(attribute) = hit.into_iter().collect();
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_picks_first_present_candidate() {
        let map = FieldMap::default();
        let resolved = map.resolve(&["Name", "title", "Date", "PublishedAt", "Slug"]);
        assert_eq!(resolved.title, vec!["title"]);
        assert_eq!(resolved.date, vec!["PublishedAt"]);
        assert_eq!(resolved.slug, vec!["Slug"]);
    }

    #[test]
    fn test_resolve_missing_attribute_is_empty() {
        let resolved = FieldMap::default().resolve(&["Title"]);
        assert!(resolved.published.is_empty());
        assert!(resolved.candidates(Attribute::Cover).is_empty());
    }
}
