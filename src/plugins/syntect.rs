//! syntax highlighting via the `syntect` crate, gated behind the
//! `syntect-highlighter` feature — grounded on the teacher's
//! `plugins/syntect.rs` `SyntectAdapter`, but flattened to the single
//! `render` call this crate's [`VerbatimSerializer`] contract asks for
//! rather than the teacher's three-method `build_pre_tag`/`build_code_tag`/
//! `highlight` split.

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::verbatim::VerbatimSerializer;

const FALLBACK_THEME: &str = "InspiredGitHub";
const FALLBACK_SYNTAX: &str = "Plain Text";

/// Highlights fenced code blocks with a bundled syntax/theme set, falling
/// back to plain text for an unrecognized or absent language tag.
pub struct SyntectVerbatimSerializer {
    theme: String,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntectVerbatimSerializer {
    /// `theme` must name one of the bundled default themes (see
    /// `ThemeSet::load_defaults`), e.g. `"InspiredGitHub"`.
    pub fn new(theme: impl Into<String>) -> Self {
        SyntectVerbatimSerializer {
            theme: theme.into(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    fn resolve_syntax(&self, language: Option<&str>, literal: &str) -> &SyntaxReference {
        let lang = language.filter(|l| !l.is_empty()).unwrap_or(FALLBACK_SYNTAX);
        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_first_line(literal))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn resolve_theme(&self) -> &Theme {
        self.theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
            .expect("syntect bundles the InspiredGitHub theme by default")
    }
}

impl VerbatimSerializer for SyntectVerbatimSerializer {
    fn render(&self, language: Option<&str>, literal: &str) -> String {
        let syntax = self.resolve_syntax(language, literal);
        let theme = self.resolve_theme();
        highlighted_html_for_string(literal, &self.syntax_set, syntax, theme).unwrap_or_else(|_| literal.to_string())
    }
}
