//! Block tree hydration
//!
//! Lists a page's blocks and recursively fetches the children of every
//! block that reports having them. Sibling fetches run concurrently and
//! results are reassembled in source order. Every child listing request
//! takes a permit from one semaphore shared by the whole traversal, so the
//! number of requests in flight never exceeds the configured concurrency
//! however deep the tree goes.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt, TryStreamExt};
use futures::FutureExt;
use tokio::sync::Semaphore;

use super::blocks::Block;
use crate::cms::{CmsError, ContentSource};

/// All direct children of a block, following the continuation cursor
pub async fn list_children(
    source: &dyn ContentSource,
    block_id: &str,
) -> Result<Vec<Block>, CmsError> {
    list_children_limited(source, block_id, None).await
}

async fn list_children_limited(
    source: &dyn ContentSource,
    block_id: &str,
    permits: Option<&Semaphore>,
) -> Result<Vec<Block>, CmsError> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let listing = {
            // The semaphore is never closed
            let _permit = match permits {
                Some(permits) => permits.acquire().await.ok(),
                None => None,
            };
            source.list_children(block_id, cursor.as_deref()).await?
        };
        let next = listing.continuation();
        blocks.extend(listing.results.into_iter().map(Block::from_raw));

        match next {
            Some(c) => {
                tracing::debug!("More children under {}, continuing at {}", block_id, c);
                cursor = Some(c);
            }
            None => break,
        }
    }

    Ok(blocks)
}

/// Fully hydrated block tree of a page (or of any block), with at most
/// `concurrency` child listings in flight
pub fn fetch_block_tree<'a>(
    source: &'a dyn ContentSource,
    block_id: &'a str,
    concurrency: usize,
) -> BoxFuture<'a, Result<Vec<Block>, CmsError>> {
    async move {
        let permits = Semaphore::new(concurrency.max(1));
        fetch_block_tree_limited(source, block_id, &permits, concurrency).await
    }
    .boxed()
}

/// Same as [`fetch_block_tree`], drawing request permits from `permits`.
///
/// Share one semaphore between several trees to bound them together.
/// `fan_out` only limits how many siblings are scheduled at once; the
/// permits bound the requests.
pub fn fetch_block_tree_limited<'a>(
    source: &'a dyn ContentSource,
    block_id: &'a str,
    permits: &'a Semaphore,
    fan_out: usize,
) -> BoxFuture<'a, Result<Vec<Block>, CmsError>> {
    async move {
        let blocks = list_children_limited(source, block_id, Some(permits)).await?;
        stream::iter(blocks)
            .map(|block| hydrate(source, block, permits, fan_out))
            .buffered(fan_out.max(1))
            .try_collect()
            .await
    }
    .boxed()
}

async fn hydrate(
    source: &dyn ContentSource,
    mut block: Block,
    permits: &Semaphore,
    fan_out: usize,
) -> Result<Block, CmsError> {
    if block.needs_hydration() {
        let from = block.children_source().to_string();
        if from != block.id {
            tracing::debug!("Synced block {} mirrors {}", block.id, from);
        }
        block.children = Some(fetch_block_tree_limited(source, &from, permits, fan_out).await?);
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::memory::{block, paragraph, text, MemorySource};
    use crate::content::blocks::BlockKind;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    fn toggle(id: &str) -> crate::cms::RawBlock {
        block(id, "toggle", true, json!({ "rich_text": text(id) }))
    }

    #[tokio::test]
    async fn test_follows_pagination_in_order() {
        // page_size 2 splits five blocks across three listings
        let source = MemorySource::new(&[]).with_children(
            "page",
            (1..=5).map(|i| paragraph(&format!("b{}", i), "x")).collect(),
        );

        let tree = fetch_block_tree(&source, "page", 4).await.unwrap();
        assert_eq!(ids(&tree), vec!["b1", "b2", "b3", "b4", "b5"]);
        assert_eq!(source.child_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_hydrates_recursively_and_leaves_stay_bare() {
        let source = MemorySource::new(&[])
            .with_children("page", vec![toggle("t1"), paragraph("p1", "leaf"), toggle("t2")])
            .with_children("t1", vec![toggle("t1a"), paragraph("t1b", "x")])
            .with_children("t1a", vec![paragraph("deep", "x")])
            .with_children("t2", vec![paragraph("t2a", "x")]);

        let tree = fetch_block_tree(&source, "page", 2).await.unwrap();

        assert_eq!(ids(&tree), vec!["t1", "p1", "t2"]);
        assert!(Block::is_hydrated(&tree));
        assert!(tree[1].children.is_none());
        assert_eq!(ids(tree[0].children()), vec!["t1a", "t1b"]);
        assert_eq!(ids(tree[0].children()[0].children()), vec!["deep"]);
        assert_eq!(ids(tree[2].children()), vec!["t2a"]);
    }

    #[tokio::test]
    async fn test_synced_block_uses_source_children() {
        let source = MemorySource::new(&[])
            .with_children(
                "page",
                vec![
                    block("orig", "synced_block", true, json!({"synced_from": null})),
                    block(
                        "alias",
                        "synced_block",
                        true,
                        json!({"synced_from": {"type": "block_id", "block_id": "orig"}}),
                    ),
                ],
            )
            .with_children("orig", vec![paragraph("shared", "Shared text")]);

        let tree = fetch_block_tree(&source, "page", 1).await.unwrap();
        assert_eq!(tree[0].children(), tree[1].children());
        assert!(matches!(tree[1].kind, BlockKind::SyncedBlock { .. }));
        assert_eq!(ids(tree[1].children()), vec!["shared"]);
    }

    #[tokio::test]
    async fn test_missing_children_propagate_error() {
        let source = MemorySource::new(&[]).with_children("page", vec![toggle("gone")]);
        let err = fetch_block_tree(&source, "page", 4).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_requests_in_flight_stay_within_concurrency() {
        // Four toggles, each with four toggles holding one paragraph
        let mut source = MemorySource::new(&[])
            .with_children("page", (0..4).map(|i| toggle(&format!("t{}", i))).collect());
        for i in 0..4 {
            let parent = format!("t{}", i);
            let kids = (0..4).map(|j| toggle(&format!("t{}{}", i, j))).collect();
            source = source
                .with_children(&parent, kids)
                .with_delay(&parent, Duration::from_millis(10));
            for j in 0..4 {
                let id = format!("t{}{}", i, j);
                source = source
                    .with_children(&id, vec![paragraph(&format!("p{}{}", i, j), "x")])
                    .with_delay(&id, Duration::from_millis(5));
            }
        }

        let tree = fetch_block_tree(&source, "page", 2).await.unwrap();

        assert_eq!(ids(&tree), vec!["t0", "t1", "t2", "t3"]);
        assert!(Block::is_hydrated(&tree));
        assert_eq!(ids(tree[3].children()), vec!["t30", "t31", "t32", "t33"]);
        // Two pages of four for the page and each toggle, one per leaf parent
        assert_eq!(source.child_calls.load(Ordering::SeqCst), 2 + 4 * 2 + 16);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_order_kept_when_earlier_siblings_finish_last() {
        let source = MemorySource::new(&[])
            .with_children("page", vec![toggle("slow"), toggle("medium"), toggle("fast")])
            .with_children("slow", vec![paragraph("s1", "x")])
            .with_children("medium", vec![paragraph("m1", "x")])
            .with_children("fast", vec![paragraph("f1", "x")])
            .with_delay("slow", Duration::from_millis(40))
            .with_delay("medium", Duration::from_millis(20));

        let tree = fetch_block_tree(&source, "page", 3).await.unwrap();

        assert_eq!(ids(&tree), vec!["slow", "medium", "fast"]);
        assert_eq!(ids(tree[0].children()), vec!["s1"]);
        assert_eq!(ids(tree[1].children()), vec!["m1"]);
        assert_eq!(ids(tree[2].children()), vec!["f1"]);
        // All three were fetched at once
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 3);
    }
}
