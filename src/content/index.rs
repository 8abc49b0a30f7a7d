//! Post index - the list of published posts from the posts database

use tokio::sync::OnceCell;

use super::post::{PostRecord, PostSummary};
use crate::cms::{CmsError, ContentSource, Filter, PageRecord, Query, SharedSource, Sort};
use crate::config::FieldMap;

/// Fetches and normalizes the published post index
pub struct PostIndex {
    source: SharedSource,
    fields: FieldMap,
    resolved: OnceCell<FieldMap>,
}

impl PostIndex {
    pub fn new(source: SharedSource, fields: FieldMap) -> Self {
        Self {
            source,
            fields,
            resolved: OnceCell::new(),
        }
    }

    /// Field names narrowed against the database schema.
    ///
    /// Resolution happens once; if the schema cannot be read the configured
    /// candidate lists are used as-is and resolution is retried next time.
    pub async fn fields(&self) -> FieldMap {
        if let Some(resolved) = self.resolved.get() {
            return resolved.clone();
        }

        match self.source.database_properties().await {
            Ok(names) => {
                let resolved = self.fields.resolve(&names);
                tracing::debug!("Resolved post fields: {:?}", resolved);
                let _ = self.resolved.set(resolved.clone());
                resolved
            }
            Err(e) => {
                tracing::warn!("Could not read database schema, probing candidates: {}", e);
                self.fields.clone()
            }
        }
    }

    /// Published posts, newest first. Rows without a slug are dropped.
    pub async fn fetch_published(&self) -> Result<Vec<PostSummary>, CmsError> {
        let fields = self.fields().await;
        let plan = query_plan(&fields);

        let mut last_error = None;
        for query in &plan {
            match query_all(self.source.as_ref(), query).await {
                Ok(pages) => {
                    let posts = summarize(&pages, &fields);
                    tracing::info!("Fetched {} rows, {} published posts", pages.len(), posts.len());
                    return Ok(posts);
                }
                Err(e) if e.is_schema_error() => {
                    tracing::warn!(
                        "Query on {:?} rejected, trying a reduced query: {}",
                        query.referenced_properties(),
                        e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CmsError::Config("empty query plan".to_string())))
    }
}

/// Queries to try, in order, until the source accepts one.
///
/// Filtered and sorted first, then filtered only, then everything; the
/// client-side pass in [`summarize`] enforces the same constraints, so each
/// step only trades server work for client work.
pub fn query_plan(fields: &FieldMap) -> Vec<Query> {
    let mut plan = Vec::new();
    for published in &fields.published {
        for date in &fields.date {
            plan.push(Query::new(
                Some(Filter::checkbox(published, true)),
                vec![Sort::descending(date)],
            ));
        }
    }
    for published in &fields.published {
        plan.push(Query::new(Some(Filter::checkbox(published, true)), Vec::new()));
    }
    plan.push(Query::default());
    plan
}

/// Run a query across every page of results
pub async fn query_all(
    source: &dyn ContentSource,
    query: &Query,
) -> Result<Vec<PageRecord>, CmsError> {
    let mut pages = Vec::new();
    let mut cursor = None;
    loop {
        let listing = source.query(&query.at(cursor)).await?;
        pages.extend(listing.results.iter().cloned());
        cursor = listing.continuation();
        if cursor.is_none() {
            break;
        }
        tracing::debug!("Following query cursor {:?}", cursor);
    }
    Ok(pages)
}

/// Decode rows, keep published posts with a slug, newest first
pub fn summarize(pages: &[PageRecord], fields: &FieldMap) -> Vec<PostSummary> {
    let mut records: Vec<PostRecord> = pages
        .iter()
        .map(|page| PostRecord::from_page(page, fields))
        .filter(|r| r.published && !r.summary.slug.is_empty())
        .collect();

    // Stable sort: the source's order breaks ties, creation time breaks the
    // tie between undated posts
    records.sort_by(|a, b| {
        PostSummary::newest_first(&a.summary, &b.summary).then_with(|| {
            if a.summary.date.is_none() && b.summary.date.is_none() {
                b.created_time.cmp(&a.created_time)
            } else {
                std::cmp::Ordering::Equal
            }
        })
    });

    records.into_iter().map(|r| r.summary).collect()
}

/// Exact slug match, falling back to an ASCII case-insensitive match
pub fn find_by_slug<'a>(posts: &'a [PostSummary], slug: &str) -> Option<&'a PostSummary> {
    posts
        .iter()
        .find(|p| p.slug == slug)
        .or_else(|| posts.iter().find(|p| p.slug.eq_ignore_ascii_case(slug)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{record, MemorySource};
    use serde_json::json;
    use std::sync::Arc;

    fn row(id: &str, slug: &str, published: bool, date: Option<&str>) -> PageRecord {
        let mut props = json!({
            "Title": {"type": "title", "title": [{"plain_text": format!("Post {}", id)}]},
            "Slug": {"type": "rich_text", "rich_text": [{"plain_text": slug}]},
            "Published": {"type": "checkbox", "checkbox": published},
        });
        if let Some(date) = date {
            props["Date"] = json!({"type": "date", "date": {"start": date}});
        }
        record(id, props)
    }

    fn source() -> MemorySource {
        MemorySource::new(&["Title", "Slug", "Published", "Date"])
            .with_record(row("a", "first", true, Some("2025-01-10")))
            .with_record(row("b", "draft", false, Some("2025-05-01")))
            .with_record(row("c", "third", true, Some("2025-03-02")))
            .with_record(row("d", "second", true, Some("2025-02-20")))
    }

    fn index(source: MemorySource) -> (Arc<MemorySource>, PostIndex) {
        let source = Arc::new(source);
        let index = PostIndex::new(source.clone(), FieldMap::default());
        (source, index)
    }

    fn slugs(posts: &[PostSummary]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_published_newest_first() {
        let (source, index) = index(source());
        let posts = index.fetch_published().await.unwrap();
        assert_eq!(slugs(&posts), vec!["third", "second", "first"]);

        // Schema resolved, so the first query is already accepted
        let queries = source.recorded_queries();
        assert_eq!(queries[0].referenced_properties(), vec!["Published", "Date"]);
        // Three published rows at two per page
        assert_eq!(queries.len(), 2);
    }

    #[tokio::test]
    async fn test_rows_without_slug_are_dropped() {
        let (_, index) = index(source().with_record(row("e", "", true, Some("2025-06-01"))));
        let posts = index.fetch_published().await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| !p.slug.is_empty()));
    }

    #[tokio::test]
    async fn test_missing_sort_property_falls_back_to_filter_only() {
        let mut source = source();
        source.properties.retain(|p| p != "Date");
        source.hide_schema = true;
        let (source, index) = index(source);

        let posts = index.fetch_published().await.unwrap();
        // Ordering still comes from the Date values on the rows
        assert_eq!(slugs(&posts), vec!["third", "second", "first"]);

        let accepted = source.recorded_queries().last().cloned().unwrap();
        assert_eq!(accepted.referenced_properties(), vec!["Published"]);
    }

    #[tokio::test]
    async fn test_alternate_published_candidate() {
        let rows: Vec<PageRecord> = source()
            .records
            .into_iter()
            .map(|mut r| {
                let published = r.properties.remove("Published").unwrap();
                r.properties.insert("IsLive".to_string(), published);
                r
            })
            .collect();
        let mut source = MemorySource::new(&["Title", "Slug", "IsLive", "Date"]);
        source.records = rows;
        source.hide_schema = true;

        let fields = FieldMap {
            published: vec!["Published".to_string(), "IsLive".to_string()],
            ..FieldMap::default()
        };
        let source = Arc::new(source);
        let index = PostIndex::new(source.clone(), fields);

        let posts = index.fetch_published().await.unwrap();
        assert_eq!(slugs(&posts), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_rejected_filter_falls_back_to_client_side_filtering() {
        let mut source = source();
        source.rejected = vec!["Published".to_string(), "Date".to_string()];
        let (source, index) = index(source);

        let posts = index.fetch_published().await.unwrap();
        assert_eq!(slugs(&posts), vec!["third", "second", "first"]);
        assert!(posts.iter().all(|p| p.slug != "draft"));

        let accepted = source.recorded_queries().last().cloned().unwrap();
        assert_eq!(accepted.filter, None);
        assert!(accepted.sorts.is_empty());
    }

    #[tokio::test]
    async fn test_no_published_property_yields_empty_index() {
        let mut source = source();
        for r in &mut source.records {
            r.properties.remove("Published");
        }
        source.properties.retain(|p| p != "Published");
        let (source, index) = index(source);

        let posts = index.fetch_published().await.unwrap();
        assert!(posts.is_empty());
        // Resolution found no published column, so only the unfiltered query ran
        assert!(source
            .recorded_queries()
            .iter()
            .all(|q| q.filter.is_none()));
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        struct Down;
        #[async_trait::async_trait]
        impl ContentSource for Down {
            async fn database_properties(&self) -> Result<Vec<String>, CmsError> {
                Ok(vec!["Published".into()])
            }
            async fn query(
                &self,
                _: &Query,
            ) -> Result<crate::cms::Listing<PageRecord>, CmsError> {
                Err(CmsError::Api {
                    status: 401,
                    code: "unauthorized".into(),
                    message: "API token is invalid.".into(),
                })
            }
            async fn list_children(
                &self,
                _: &str,
                _: Option<&str>,
            ) -> Result<crate::cms::Listing<crate::cms::RawBlock>, CmsError> {
                unreachable!()
            }
        }

        let index = PostIndex::new(Arc::new(Down), FieldMap::default());
        let err = index.fetch_published().await.unwrap_err();
        assert!(matches!(err, CmsError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let (_, index) = index(source());
        let posts = index.fetch_published().await.unwrap();
        let post = find_by_slug(&posts, "second").unwrap();
        assert_eq!(post.slug, "second");
        assert_eq!(post.title, "Post d");

        assert_eq!(find_by_slug(&posts, "SECOND").unwrap().slug, "second");
        assert!(find_by_slug(&posts, "draft").is_none());
        assert!(find_by_slug(&posts, "nope").is_none());
    }

    #[test]
    fn test_exact_match_wins_over_case_insensitive() {
        let post = |slug: &str| PostSummary {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: String::new(),
            excerpt: None,
            date: None,
            tags: Vec::new(),
            author: None,
            cover: None,
            url: String::new(),
        };
        let posts = vec![post("Launch"), post("launch")];
        assert_eq!(find_by_slug(&posts, "launch").unwrap().id, "launch");
        assert_eq!(find_by_slug(&posts, "LAUNCH").unwrap().id, "Launch");
    }

    #[test]
    fn test_query_plan_ends_unfiltered() {
        let plan = query_plan(&FieldMap::default());
        // 2 published candidates x 4 date candidates, 2 filter-only, 1 bare
        assert_eq!(plan.len(), 11);
        assert_eq!(plan.last(), Some(&Query::default()));

        let resolved = FieldMap::default().resolve(&["Published"]);
        let plan = query_plan(&resolved);
        assert_eq!(plan.len(), 2);
        assert!(plan[0].sorts.is_empty());
    }
}
