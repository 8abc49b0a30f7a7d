//! Markdown rendering for static pages

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::render::Highlighter;

/// Markdown renderer that routes fenced code through the highlighter
pub struct MarkdownRenderer<'a> {
    highlighter: &'a Highlighter,
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(highlighter: &'a Highlighter) -> Self {
        Self { highlighter }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front matter is split off before rendering, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, body)) = code.take() {
                        let highlighted = self.highlighter.highlight(&body, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code.as_mut() {
                    Some((_, body)) => body.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let highlighter = Highlighter::new();
        let html = MarkdownRenderer::new(&highlighter)
            .render("# About BitFtx\n\nPredict **anything**.")
            .unwrap();
        assert!(html.contains("<h1>About BitFtx</h1>"));
        assert!(html.contains("<p>Predict <strong>anything</strong>.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let highlighter = Highlighter::new();
        let renderer = MarkdownRenderer::new(&highlighter);

        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"<figure class="highlight rust">"#));

        let html = renderer.render("    a < b\n").unwrap();
        assert!(html.contains(r#"<pre><code class="language-text">a &lt; b"#));
    }
}
