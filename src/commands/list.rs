//! List site content

use anyhow::Result;

use crate::content::loader::PageLoader;
use crate::helpers::display_date;
use crate::render::Highlighter;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let blog = site.blog(site.content_source()?);
            let posts = blog.posts().await?;
            println!("Posts ({}):", posts.len());
            for post in posts.iter() {
                let date = post
                    .date
                    .as_deref()
                    .map(|d| display_date(d, &site.config.date_format))
                    .unwrap_or_else(|| "undated".to_string());
                println!("  {} - {} [{}]", date, post.title, post.slug);
            }
        }
        "page" | "pages" => {
            let highlighter = Highlighter::new();
            let pages = PageLoader::new(&site.source_dir, &highlighter).load_pages()?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} [{}] -> /{}", page.title, page.source, page.path);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, page", content_type);
        }
    }

    Ok(())
}
