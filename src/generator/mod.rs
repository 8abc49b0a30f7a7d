//! Generator module - writes the site as static HTML files

use anyhow::{Context as _, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{Blog, Page, PostDetail};
use crate::helpers;
use crate::templates::Views;
use crate::Site;

/// What a generation run wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub posts: usize,
    pub pages: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    site: Site,
    views: Views,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            views: Views::new(&site.config)?,
            site: site.clone(),
        })
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// Generate the entire site
    pub async fn generate(&self, blog: &Blog, pages: &[Page]) -> Result<GenerateReport> {
        fs::create_dir_all(&self.site.public_dir)?;

        let assets = self.copy_source_assets()?;
        let posts = self.generate_blog(blog).await?;

        for page in pages {
            self.write(&page.path, &self.views.page(page)?)?;
        }

        self.write("careers/", &self.views.careers()?)?;
        self.write("contact/", &self.views.contact()?)?;
        self.write_file("404.html", &self.views.not_found()?)?;

        Ok(GenerateReport {
            posts,
            pages: pages.len(),
            assets,
        })
    }

    /// Blog index plus one page per published post
    async fn generate_blog(&self, blog: &Blog) -> Result<usize> {
        let posts = blog.posts().await.context("Failed to fetch the post index")?;
        let blog_path = helpers::blog_path(&self.site.config);
        self.write(&blog_path, &self.views.blog_index(&posts)?)?;
        self.write_file(
            &format!("{}404.html", blog_path),
            &self.views.post_not_found()?,
        )?;

        let concurrency = self.site.config.cms.fetch_concurrency();
        let details: Vec<PostDetail> = stream::iter(posts.iter())
            .map(|summary| async move {
                let blocks = blog
                    .body(&summary.id)
                    .await
                    .with_context(|| format!("Failed to fetch the body of {:?}", summary.slug))?;
                Ok::<_, anyhow::Error>(PostDetail {
                    summary: summary.clone(),
                    blocks,
                })
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        for detail in &details {
            let path = format!("{}{}/", blog_path, detail.summary.slug);
            self.write(&path, &self.views.post(detail)?)?;
            tracing::debug!("Generated {}", path);
        }

        Ok(details.len())
    }

    /// Write `html` to `<path>index.html` under the public directory
    fn write(&self, path: &str, html: &str) -> Result<()> {
        self.write_file(&format!("{}index.html", path.trim_start_matches('/')), html)
    }

    fn write_file(&self, relative: &str, contents: &str) -> Result<()> {
        let dest = self.site.public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, contents).with_context(|| format!("Failed to write {:?}", dest))?;
        Ok(())
    }

    /// Copy non-markdown files from the source directory, skipping `_` entries
    fn copy_source_assets(&self) -> Result<usize> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('_'))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_markdown(path) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}
