//! Static page loader - markdown files in the source directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Page};
use crate::render::Highlighter;

/// Loads markdown pages from the source directory
pub struct PageLoader<'a> {
    source_dir: PathBuf,
    renderer: MarkdownRenderer<'a>,
}

impl<'a> PageLoader<'a> {
    pub fn new(source_dir: impl Into<PathBuf>, highlighter: &'a Highlighter) -> Self {
        Self {
            source_dir: source_dir.into(),
            renderer: MarkdownRenderer::new(highlighter),
        }
    }

    /// Load all published pages. Directories starting with `_` are skipped.
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        if !self.source_dir.exists() {
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('_')
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !(path.is_file() && is_markdown_file(path)) {
                continue;
            }

            match self.load_page(path) {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => tracing::debug!("Skipping unpublished page {:?}", path),
                Err(e) => tracing::warn!("Failed to load page {:?}: {}", path, e),
            }
        }

        pages.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(pages)
    }

    /// Load a single page; `None` when it is unpublished
    pub fn load_page(&self, path: &Path) -> Result<Option<Page>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;
        if !fm.published {
            return Ok(None);
        }

        let title = fm.title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let source = path
            .strip_prefix(&self.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let page_path = match fm.permalink {
            Some(permalink) => normalize_permalink(&permalink),
            None => page_path(&source),
        };

        let mut page = Page::new(title, source);
        page.description = fm.description;
        page.content = self.renderer.render(body)?;
        page.layout = fm.layout.unwrap_or_else(|| "page".to_string());
        page.full_source = path.to_path_buf();
        page.path = page_path;
        page.extra = fm.extra;

        Ok(Some(page))
    }
}

/// Output path of a page source: `about.md` -> `about/`,
/// `legal/index.md` -> `legal/`, `index.md` -> ``
fn page_path(source: &str) -> String {
    let without_ext = source
        .trim_end_matches(".md")
        .trim_end_matches(".markdown");

    if without_ext == "index" {
        String::new()
    } else if let Some(dir) = without_ext.strip_suffix("/index") {
        format!("{}/", dir)
    } else {
        format!("{}/", without_ext)
    }
}

fn normalize_permalink(permalink: &str) -> String {
    let trimmed = permalink.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
