//! URL helper functions

use url::{ParseError, Url};

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of the blog index, relative to the root, e.g. `blog/`
pub fn blog_path(config: &SiteConfig) -> String {
    format!("{}/", config.blog_dir.trim_matches('/'))
}

/// Path of a post, relative to the root, e.g. `blog/launch/`
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    format!(
        "{}{}/",
        blog_path(config),
        percent_encoding::utf8_percent_encode(slug, PATH_SEGMENT)
    )
}

/// Characters escaped inside a single path segment
const PATH_SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Whether a link points off-site
pub fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Whether a link target is safe to emit: `http(s)`, `mailto`, or relative
pub fn is_safe_url(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
