//! Syntax highlighting service
//!
//! Renders paste content to highlighted HTML using syntect. Syntax and
//! theme definitions are loaded once at construction.

use anyhow::{Context, Result};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::models::Syntax;

/// Default syntect theme
const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Highlighting service
#[derive(Clone)]
pub struct HighlightService {
    syntax_set: SyntaxSet,
    theme_set: std::sync::Arc<ThemeSet>,
    theme_name: String,
}

impl Default for HighlightService {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightService {
    /// Create a highlighter with the default theme
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Create a highlighter with a specific theme, falling back to the
    /// default when the theme is unknown.
    pub fn with_theme(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();

        let validated_theme = if theme_set.themes.contains_key(theme_name) {
            theme_name.to_string()
        } else {
            DEFAULT_THEME.to_string()
        };

        Self {
            syntax_set,
            theme_set: std::sync::Arc::new(theme_set),
            theme_name: validated_theme,
        }
    }

    /// Render content as highlighted HTML
    pub fn render(&self, content: &str, syntax: Syntax) -> Result<String> {
        let syntax_ref = self
            .syntax_set
            .find_syntax_by_token(syntax_token(syntax))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = &self.theme_set.themes[&self.theme_name];
        highlighted_html_for_string(content, &self.syntax_set, syntax_ref, theme)
            .context("Failed to highlight content")
    }
}

/// Token syntect resolves for each supported syntax
fn syntax_token(syntax: Syntax) -> &'static str {
    match syntax {
        Syntax::Plaintext => "txt",
        Syntax::Javascript => "js",
        Syntax::Typescript => "ts",
        Syntax::Python => "py",
        Syntax::Java => "java",
        Syntax::Csharp => "cs",
        Syntax::Html => "html",
        Syntax::Css => "css",
        Syntax::Php => "php",
        Syntax::Ruby => "rb",
        Syntax::Go => "go",
        Syntax::Rust => "rs",
        Syntax::C => "c",
        Syntax::Cpp => "cpp",
        Syntax::Shell => "sh",
        Syntax::Sql => "sql",
        Syntax::Json => "json",
        Syntax::Yaml => "yaml",
        Syntax::Markdown => "md",
        Syntax::Xml => "xml",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rust_code() {
        let service = HighlightService::new();
        let html = service
            .render("fn main() { println!(\"hi\"); }", Syntax::Rust)
            .unwrap();
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_render_plaintext() {
        let service = HighlightService::new();
        let html = service.render("just words", Syntax::Plaintext).unwrap();
        assert!(html.contains("just words"));
    }

    #[test]
    fn test_render_escapes_html() {
        let service = HighlightService::new();
        let html = service
            .render("<script>alert(1)</script>", Syntax::Plaintext)
            .unwrap();
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let service = HighlightService::with_theme("no-such-theme");
        let html = service.render("x = 1", Syntax::Python).unwrap();
        assert!(html.contains("<pre"));
    }

    #[test]
    fn test_all_syntaxes_render() {
        let service = HighlightService::new();
        for syntax in crate::models::Syntax::ALL {
            service.render("sample", *syntax).unwrap();
        }
    }
}
