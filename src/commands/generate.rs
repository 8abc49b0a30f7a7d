//! Generate static files

use anyhow::{Context, Result};

use crate::content::loader::PageLoader;
use crate::generator::Generator;
use crate::Site;

/// Generate the site from the configured content source
pub async fn run(site: &Site) -> Result<()> {
    let source = site
        .content_source()
        .context("Blog generation needs Notion credentials")?;
    let blog = site.blog(source);
    run_with_blog(site, &blog).await
}

/// Generate the site from an existing blog service
pub async fn run_with_blog(site: &Site, blog: &crate::content::Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site)?;
    let pages = PageLoader::new(&site.source_dir, generator.views().blocks().highlighter())
        .load_pages()?;
    tracing::info!("Loaded {} pages", pages.len());

    let report = generator.generate(blog, &pages).await?;
    tracing::info!(
        "Generated {} posts, {} pages, {} assets in {:.2}s",
        report.posts,
        report.pages,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
