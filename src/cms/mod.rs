//! Content source - the Notion workspace the blog is written in
//!
//! The site only ever reads from the source: a database query for the post
//! index, and child listings for post bodies. Both are paginated with an
//! opaque continuation cursor.

mod client;
mod error;
#[cfg(test)]
pub mod memory;
mod query;
mod types;

use async_trait::async_trait;
use std::sync::Arc;

pub use client::NotionClient;
pub use error::CmsError;
pub use query::{Filter, Query, Sort};
pub use types::{ApiErrorBody, FileRef, Listing, PageRecord, RawBlock, UrlRef};

/// Read-only access to a remote content database
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Names of the properties defined on the posts database
    async fn database_properties(&self) -> Result<Vec<String>, CmsError>;

    /// Run one page of a database query
    async fn query(&self, query: &Query) -> Result<Listing<PageRecord>, CmsError>;

    /// List one page of the children of a page or block
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Listing<RawBlock>, CmsError>;
}

/// Content source shared between the server, generator, and caches
pub type SharedSource = Arc<dyn ContentSource>;
