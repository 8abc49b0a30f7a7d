//! Content module - blog posts from the content source, block trees, and
//! static markdown pages

mod blocks;
mod blog;
mod frontmatter;
mod index;
pub mod loader;
mod markdown;
mod post;
mod properties;
mod tree;

pub use blocks::{plain_text, Annotations, Block, BlockKind, ListKind, Media, RichText};
pub use blog::{Blog, PostDetail};
pub use frontmatter::FrontMatter;
pub use index::{find_by_slug, query_plan, PostIndex};
pub use markdown::MarkdownRenderer;
pub use post::{parse_iso_date, Page, PostRecord, PostSummary};
pub use tree::{fetch_block_tree, fetch_block_tree_limited, list_children};
