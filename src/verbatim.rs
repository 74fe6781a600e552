//! Verbatim (code block) rendering strategy, keyed by language tag, with a
//! default registered under a sentinel key — grounded on the teacher's
//! `SyntaxHighlighterAdapter` (`src/adapters.rs`) but specialized to the
//! narrower verbatim-only contract this spec calls for.

use crate::html::attributes::Attributes;

/// Implemented by a code-block renderer. `language` is `None` for an
/// indented block or a fenced block with no info string.
pub trait VerbatimSerializer: Send + Sync {
    fn render(&self, language: Option<&str>, literal: &str) -> String;
}

/// Replaces leading newlines with `<br/>` and HTML-encodes the remainder,
/// wrapped in `<pre><code class="lang">`, exactly as §4.3 "Code blocks"
/// describes the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultVerbatimSerializer;

impl VerbatimSerializer for DefaultVerbatimSerializer {
    fn render(&self, language: Option<&str>, literal: &str) -> String {
        let mut attrs = Attributes::default();
        if let Some(lang) = language {
            if !lang.is_empty() {
                attrs.add("class", lang);
            }
        }
        let mut out = String::from("<pre><code");
        out.push_str(&attrs.to_string());
        out.push('>');

        let mut chars = literal.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c == '\n' {
                out.push_str("<br/>");
                chars.next();
            } else {
                break;
            }
        }
        let rest: String = chars.collect();
        out.push_str(&escape_code(&rest));
        out.push_str("</code></pre>");
        out
    }
}

fn escape_code(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// The sentinel key under which the default renderer is registered, so a
/// lookup miss on an explicit language tag falls back to it (§6.3).
pub const DEFAULT_KEY: &str = "";

/// Resolves a language tag against the registered serializers, falling back
/// to [`DefaultVerbatimSerializer`] when no entry (or the sentinel) matches.
pub fn resolve<'a>(
    serializers: &'a [(String, std::sync::Arc<dyn VerbatimSerializer>)],
    language: Option<&str>,
) -> &'a dyn VerbatimSerializer {
    if let Some(lang) = language {
        if let Some((_, s)) = serializers.iter().find(|(k, _)| k == lang) {
            return s.as_ref();
        }
    }
    if let Some((_, s)) = serializers.iter().find(|(k, _)| k == DEFAULT_KEY) {
        return s.as_ref();
    }
    &DEFAULT_SINGLETON
}

static DEFAULT_SINGLETON: DefaultVerbatimSerializer = DefaultVerbatimSerializer;

/// Convenience constructor mirroring how a caller would seed
/// `Plugins::verbatim_serializers` with per-language entries, e.g.
/// `map_of(vec![("rust", my_adapter)])`.
pub fn map_of(
    entries: Vec<(&str, std::sync::Arc<dyn VerbatimSerializer>)>,
) -> Vec<(String, std::sync::Arc<dyn VerbatimSerializer>)> {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
