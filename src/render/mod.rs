//! HTML rendering of hydrated block trees
//!
//! Every block kind maps to one rendering rule. Consecutive list items of
//! the same kind share one `<ul>`/`<ol>` container, and tables are rebuilt
//! from their row children.

mod highlight;
mod rich_text;

pub use highlight::Highlighter;
pub use rich_text::render_rich_text;

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::{plain_text, Block, BlockKind, ListKind, Media, RichText};
use crate::helpers::{html_escape, is_external, is_safe_url};

lazy_static! {
    static ref YOUTUBE: Regex = Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})"
    )
    .unwrap();
}

/// Renders block trees to HTML fragments
pub struct HtmlRenderer {
    highlighter: Highlighter,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::with_highlighter(Highlighter::new())
    }

    pub fn with_highlighter(highlighter: Highlighter) -> Self {
        Self { highlighter }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Render sibling blocks in order, grouping list runs
    pub fn render_blocks(&self, blocks: &[Block]) -> String {
        let mut html = String::new();
        let mut i = 0;

        while i < blocks.len() {
            let Some(kind) = blocks[i].list_kind() else {
                html.push_str(&self.render_block(&blocks[i]));
                i += 1;
                continue;
            };

            let run = blocks[i..]
                .iter()
                .take_while(|b| b.list_kind() == Some(kind))
                .count();
            let tag = match kind {
                ListKind::Bulleted => "ul",
                ListKind::Numbered => "ol",
            };

            html.push_str(&format!("<{}>", tag));
            for item in &blocks[i..i + run] {
                html.push_str(&format!(
                    "<li>{}{}</li>",
                    render_rich_text(item.text()),
                    self.render_blocks(item.children())
                ));
            }
            html.push_str(&format!("</{}>", tag));
            i += run;
        }

        html
    }

    /// Render a single block. List items rendered alone get their own
    /// container.
    pub fn render_block(&self, block: &Block) -> String {
        let children = || self.render_blocks(block.children());

        match &block.kind {
            BlockKind::Paragraph { text } => {
                let p = format!("<p>{}</p>", render_rich_text(text));
                if block.children().is_empty() {
                    p
                } else {
                    format!(r#"{}<div class="indent">{}</div>"#, p, children())
                }
            }
            BlockKind::Heading { level, text } => {
                let tag = format!("h{}", (level + 1).min(4));
                let anchor = slug::slugify(plain_text(text));
                let id = if anchor.is_empty() {
                    String::new()
                } else {
                    format!(r#" id="{}""#, anchor)
                };
                format!(
                    "<{0}{1}>{2}</{0}>{3}",
                    tag,
                    id,
                    render_rich_text(text),
                    children()
                )
            }
            BlockKind::BulletedListItem { .. } | BlockKind::NumberedListItem { .. } => {
                self.render_blocks(std::slice::from_ref(block))
            }
            BlockKind::Quote { text } => {
                format!("<blockquote>{}{}</blockquote>", render_rich_text(text), children())
            }
            BlockKind::Callout { text, icon } => {
                let icon = icon
                    .as_deref()
                    .map(|i| format!(r#"<span class="callout-icon">{}</span>"#, html_escape(i)))
                    .unwrap_or_default();
                format!(
                    r#"<div class="callout">{}<div class="callout-body">{}{}</div></div>"#,
                    icon,
                    render_rich_text(text),
                    children()
                )
            }
            BlockKind::Code {
                text,
                language,
                caption,
            } => {
                let code = self
                    .highlighter
                    .highlight(&plain_text(text), language.as_deref());
                if caption.is_empty() {
                    code
                } else {
                    format!(
                        r#"<figure class="code">{}<figcaption>{}</figcaption></figure>"#,
                        code,
                        render_rich_text(caption)
                    )
                }
            }
            BlockKind::Image(media) => render_image(media),
            BlockKind::Video(media) => render_video(media),
            BlockKind::File(media) => render_file(media),
            BlockKind::Embed { url, caption } => {
                if url.is_empty() || !is_safe_url(url) {
                    return String::new();
                }
                format!(
                    r#"<figure class="embed"><iframe src="{}" loading="lazy" allowfullscreen></iframe>{}</figure>"#,
                    html_escape(url),
                    figcaption(caption)
                )
            }
            BlockKind::Bookmark { url, caption } => {
                if url.is_empty() {
                    return String::new();
                }
                let label = if caption.is_empty() {
                    html_escape(url)
                } else {
                    render_rich_text(caption)
                };
                if !is_safe_url(url) {
                    return format!(r#"<p class="bookmark">{}</p>"#, label);
                }
                format!(
                    r#"<a class="bookmark" href="{0}" target="_blank" rel="noopener noreferrer"><span class="bookmark-title">{1}</span><span class="bookmark-url">{0}</span></a>"#,
                    html_escape(url),
                    label
                )
            }
            BlockKind::Table {
                width,
                column_header,
                row_header,
            } => render_table(block.children(), *width, *column_header, *row_header),
            // Rows only render through their table
            BlockKind::TableRow { .. } => String::new(),
            BlockKind::Divider => "<hr>".to_string(),
            BlockKind::Equation { expression } => {
                format!(r#"<div class="equation">{}</div>"#, html_escape(expression))
            }
            BlockKind::ToDo { text, checked } => format!(
                r#"<div class="to-do"><label><input type="checkbox" disabled{}> <span>{}</span></label>{}</div>"#,
                if *checked { " checked" } else { "" },
                render_rich_text(text),
                children()
            ),
            BlockKind::Toggle { text } => format!(
                "<details><summary>{}</summary>{}</details>",
                render_rich_text(text),
                children()
            ),
            BlockKind::SyncedBlock { .. } => children(),
            BlockKind::Unsupported(kind) => {
                tracing::debug!("Skipping unsupported block {} ({})", block.id, kind);
                String::new()
            }
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn figcaption(caption: &[RichText]) -> String {
    if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", render_rich_text(caption))
    }
}

/// Media URL, unless its scheme could run script
fn media_url(media: &Media) -> Option<&str> {
    media.url.as_deref().filter(|u| is_safe_url(u))
}

fn render_image(media: &Media) -> String {
    let Some(url) = media_url(media) else {
        return String::new();
    };
    let alt = plain_text(&media.caption);
    let alt = if alt.is_empty() { "image".to_string() } else { alt };
    format!(
        r#"<figure class="image"><img src="{}" alt="{}" loading="lazy">{}</figure>"#,
        html_escape(url),
        html_escape(&alt),
        figcaption(&media.caption)
    )
}

/// YouTube video id of a watch, short, or embed URL
pub fn youtube_id(url: &str) -> Option<&str> {
    YOUTUBE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn render_video(media: &Media) -> String {
    let Some(url) = media_url(media) else {
        return String::new();
    };
    let player = match youtube_id(url) {
        Some(id) => format!(
            r#"<iframe src="https://www.youtube.com/embed/{}" loading="lazy" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#,
            id
        ),
        None => format!(r#"<video controls src="{}"></video>"#, html_escape(url)),
    };
    format!(
        r#"<figure class="video">{}{}</figure>"#,
        player,
        figcaption(&media.caption)
    )
}

fn render_file(media: &Media) -> String {
    let Some(url) = media_url(media) else {
        return String::new();
    };
    let label = media
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| Some(plain_text(&media.caption)).filter(|c| !c.is_empty()))
        .unwrap_or_else(|| "Download file".to_string());
    let target = if is_external(url) {
        r#" target="_blank" rel="noopener noreferrer""#
    } else {
        ""
    };
    format!(
        r#"<p class="file"><a href="{}"{}>{}</a></p>"#,
        html_escape(url),
        target,
        html_escape(&label)
    )
}

fn render_table(rows: &[Block], width: usize, column_header: bool, row_header: bool) -> String {
    let mut head = String::new();
    let mut body = String::new();

    for (r, row) in rows.iter().enumerate() {
        let BlockKind::TableRow { cells } = &row.kind else {
            continue;
        };
        let in_head = column_header && r == 0;
        let columns = width.max(cells.len());

        let mut tr = String::from("<tr>");
        for c in 0..columns {
            let content = cells.get(c).map(|cell| render_rich_text(cell)).unwrap_or_default();
            if in_head {
                tr.push_str(&format!(r#"<th scope="col">{}</th>"#, content));
            } else if row_header && c == 0 {
                tr.push_str(&format!(r#"<th scope="row">{}</th>"#, content));
            } else {
                tr.push_str(&format!("<td>{}</td>", content));
            }
        }
        tr.push_str("</tr>");

        if in_head {
            head.push_str(&tr);
        } else {
            body.push_str(&tr);
        }
    }

    let head = if head.is_empty() {
        head
    } else {
        format!("<thead>{}</thead>", head)
    };
    format!(r#"<table class="table">{}<tbody>{}</tbody></table>"#, head, body)
}
