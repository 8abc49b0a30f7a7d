//! Inline rendering of rich-text spans

use crate::content::{Annotations, RichText};
use crate::helpers::{html_escape, is_external, is_safe_url};

/// Render spans to inline HTML
pub fn render_rich_text(spans: &[RichText]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &RichText) -> String {
    let text = html_escape(&span.plain_text).replace('\n', "<br>");
    let mut html = annotate(text, &span.annotations);

    // Unsafe targets keep their text without the link
    if let Some(href) = span
        .href
        .as_deref()
        .filter(|h| !h.is_empty() && is_safe_url(h))
    {
        html = if is_external(href) {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                html_escape(href),
                html
            )
        } else {
            format!(r#"<a href="{}">{}</a>"#, html_escape(href), html)
        };
    }

    html
}

/// Wrap text innermost-first: code, bold, italic, strikethrough, underline
fn annotate(text: String, a: &Annotations) -> String {
    let layers = [
        (a.code, "code"),
        (a.bold, "strong"),
        (a.italic, "em"),
        (a.strikethrough, "s"),
        (a.underline, "u"),
    ];
    layers
        .iter()
        .filter(|(on, _)| *on)
        .fold(text, |inner, (_, tag)| format!("<{0}>{1}</{0}>", tag, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, annotations: Annotations, href: Option<&str>) -> RichText {
        RichText {
            plain_text: text.to_string(),
            annotations,
            href: href.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let html = render_rich_text(&[RichText::plain("1 < 2 & \"ok\"")]);
        assert_eq!(html, "1 &lt; 2 &amp; &quot;ok&quot;");
    }

    #[test]
    fn test_annotation_nesting_order() {
        let all = Annotations {
            bold: true,
            italic: true,
            strikethrough: true,
            underline: true,
            code: true,
        };
        assert_eq!(
            render_rich_text(&[span("x", all, None)]),
            "<u><s><em><strong><code>x</code></strong></em></s></u>"
        );

        let bold_italic = Annotations {
            bold: true,
            italic: true,
            ..Annotations::default()
        };
        assert_eq!(
            render_rich_text(&[span("y", bold_italic, None)]),
            "<em><strong>y</strong></em>"
        );
    }

    #[test]
    fn test_links_wrap_outermost() {
        let bold = Annotations {
            bold: true,
            ..Annotations::default()
        };
        assert_eq!(
            render_rich_text(&[span("docs", bold, Some("https://bitftx.com/docs"))]),
            r#"<a href="https://bitftx.com/docs" target="_blank" rel="noopener noreferrer"><strong>docs</strong></a>"#
        );
        assert_eq!(
            render_rich_text(&[span("page", Annotations::default(), Some("/abc123"))]),
            r#"<a href="/abc123">page</a>"#
        );
    }

    #[test]
    fn test_script_links_keep_only_text() {
        assert_eq!(
            render_rich_text(&[span("x", Annotations::default(), Some("javascript:alert(1)"))]),
            "x"
        );
        assert_eq!(
            render_rich_text(&[span("mail", Annotations::default(), Some("mailto:a@b.c"))]),
            r#"<a href="mailto:a@b.c">mail</a>"#
        );
    }

    #[test]
    fn test_newlines_become_breaks() {
        let html = render_rich_text(&[RichText::plain("line one\nline two"), RichText::plain("!")]);
        assert_eq!(html, "line one<br>line two!");
    }
}
