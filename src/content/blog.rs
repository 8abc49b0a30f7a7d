//! Blog service - cached access to the post index and post bodies

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::blocks::Block;
use super::index::{find_by_slug, PostIndex};
use super::post::PostSummary;
use super::tree::fetch_block_tree_limited;
use crate::cache::RevalidatingCache;
use crate::cms::{CmsError, SharedSource};
use crate::config::CmsConfig;

/// A post together with its hydrated body
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub blocks: Arc<Vec<Block>>,
}

/// Published posts and their bodies, revalidated after a fixed window
pub struct Blog {
    source: SharedSource,
    index: PostIndex,
    concurrency: usize,
    /// Child listing permits shared by every body fetch
    permits: Semaphore,
    posts: RevalidatingCache<(), Arc<Vec<PostSummary>>>,
    bodies: RevalidatingCache<String, Arc<Vec<Block>>>,
}

impl Blog {
    pub fn new(source: SharedSource, cms: &CmsConfig) -> Self {
        let window = Duration::from_secs(cms.revalidate_secs);
        Self {
            index: PostIndex::new(source.clone(), cms.fields.clone()),
            source,
            concurrency: cms.fetch_concurrency(),
            permits: Semaphore::new(cms.fetch_concurrency()),
            posts: RevalidatingCache::new(window),
            bodies: RevalidatingCache::new(window),
        }
    }

    /// Published posts, newest first
    pub async fn posts(&self) -> Result<Arc<Vec<PostSummary>>, CmsError> {
        self.posts
            .get_or_fetch((), || async {
                self.index.fetch_published().await.map(Arc::new)
            })
            .await
    }

    pub async fn slugs(&self) -> Result<Vec<String>, CmsError> {
        Ok(self.posts().await?.iter().map(|p| p.slug.clone()).collect())
    }

    pub async fn post(&self, slug: &str) -> Result<Option<PostSummary>, CmsError> {
        let posts = self.posts().await?;
        Ok(find_by_slug(&posts, slug).cloned())
    }

    /// Hydrated block tree of a page
    pub async fn body(&self, page_id: &str) -> Result<Arc<Vec<Block>>, CmsError> {
        self.bodies
            .get_or_fetch(page_id.to_string(), || async {
                let blocks = fetch_block_tree_limited(
                    self.source.as_ref(),
                    page_id,
                    &self.permits,
                    self.concurrency,
                )
                .await?;
                tracing::debug!("Hydrated {} top-level blocks for {}", blocks.len(), page_id);
                Ok(Arc::new(blocks))
            })
            .await
    }

    /// Post and body by slug; `None` when no published post has the slug
    pub async fn post_detail(&self, slug: &str) -> Result<Option<PostDetail>, CmsError> {
        let Some(summary) = self.post(slug).await? else {
            return Ok(None);
        };
        let blocks = self.body(&summary.id).await?;
        Ok(Some(PostDetail { summary, blocks }))
    }

    /// Forget everything cached
    pub async fn invalidate(&self) {
        self.posts.clear().await;
        self.bodies.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{paragraph, record, MemorySource};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn post(id: &str, slug: &str) -> crate::cms::PageRecord {
        record(
            id,
            json!({
                "Title": {"type": "title", "title": [{"plain_text": slug}]},
                "Slug": {"type": "rich_text", "rich_text": [{"plain_text": slug}]},
                "Published": {"type": "checkbox", "checkbox": true}
            }),
        )
    }

    fn source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new(&["Title", "Slug", "Published"])
                .with_record(post("p1", "hello"))
                .with_children("p1", vec![paragraph("b1", "Hi")]),
        )
    }

    #[tokio::test]
    async fn test_index_is_cached_within_window() {
        let source = source();
        let blog = Blog::new(source.clone(), &CmsConfig::default());

        assert_eq!(blog.slugs().await.unwrap(), vec!["hello"]);
        assert!(blog.post("hello").await.unwrap().is_some());
        assert!(blog.post("nope").await.unwrap().is_none());
        assert_eq!(source.recorded_queries().len(), 1);

        blog.invalidate().await;
        blog.posts().await.unwrap();
        assert_eq!(source.recorded_queries().len(), 2);
    }

    #[tokio::test]
    async fn test_post_detail_hydrates_body_once() {
        let source = source();
        let blog = Blog::new(source.clone(), &CmsConfig::default());

        let detail = blog.post_detail("hello").await.unwrap().unwrap();
        assert_eq!(detail.summary.id, "p1");
        assert_eq!(detail.blocks.len(), 1);

        blog.post_detail("hello").await.unwrap();
        assert_eq!(source.child_calls.load(Ordering::SeqCst), 1);

        assert!(blog.post_detail("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_body_fetches_share_one_request_limit() {
        let source = Arc::new(
            MemorySource::new(&["Title", "Slug", "Published"])
                .with_record(post("p1", "one"))
                .with_record(post("p2", "two"))
                .with_children("p1", vec![paragraph("a", "x")])
                .with_children("p2", vec![paragraph("b", "x")])
                .with_delay("p1", Duration::from_millis(10))
                .with_delay("p2", Duration::from_millis(10)),
        );
        let cms = CmsConfig {
            fetch_concurrency: 1,
            ..CmsConfig::default()
        };
        let blog = Blog::new(source.clone(), &cms);

        let (one, two) = tokio::join!(blog.body("p1"), blog.body("p2"));
        assert_eq!(one.unwrap()[0].id, "a");
        assert_eq!(two.unwrap()[0].id, "b");
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    }
}
