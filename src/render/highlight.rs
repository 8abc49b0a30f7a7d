//! Code highlighting with syntect

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::helpers::html_escape;

/// Syntax highlighter shared by block and markdown rendering
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    fn syntax(&self, lang: &str) -> Option<&SyntaxReference> {
        let token = match lang {
            "plain text" | "text" | "" => return None,
            "c++" => "cpp",
            "c#" => "cs",
            "shell" | "bash" => "sh",
            "objective-c" => "m",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }

    /// Highlight a code block. Unknown languages, or a highlighting
    /// failure, fall back to a plain escaped `<pre><code>`.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text").trim().to_ascii_lowercase();
        let class = language_class(&lang);

        let highlighted = match (self.syntax(&lang), self.theme()) {
            (Some(syntax), Some(theme)) => {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            }
            _ => None,
        };

        match highlighted {
            Some(html) => format!(r#"<figure class="highlight {}">{}</figure>"#, class, html),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class,
                html_escape(code)
            ),
        }
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// CSS-safe language name, e.g. `plain text` -> `plain-text`
fn language_class(lang: &str) -> String {
    let class: String = lang
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '+' || c == '#' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if class.is_empty() {
        "text".to_string()
    } else {
        class
    }
}
