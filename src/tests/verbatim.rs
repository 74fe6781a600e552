use super::*;

use crate::verbatim::{self, DefaultVerbatimSerializer, VerbatimSerializer};

#[test]
fn indented_code_block_has_no_class_attribute() {
    html("    foo\n", "<pre><code>foo\n</code></pre>\n");
}

#[test]
fn fenced_code_block_with_language_gets_class_attribute() {
    html_ext(
        "```rust\nfn main() {}\n```\n",
        "<pre><code class=\"rust\">fn main() {}\n</code></pre>\n",
        |e| e.fenced_code_blocks = true,
    );
}

#[test]
fn fenced_code_block_without_info_string_has_no_class_attribute() {
    html_ext(
        "```\nplain\n```\n",
        "<pre><code>plain\n</code></pre>\n",
        |e| e.fenced_code_blocks = true,
    );
}

#[test]
fn default_serializer_escapes_angle_brackets_and_ampersands() {
    let rendered = DefaultVerbatimSerializer.render(None, "<a> & <b>");
    assert_eq!(rendered, "<pre><code>&lt;a&gt; &amp; &lt;b&gt;</code></pre>");
}

#[test]
fn default_serializer_turns_leading_newlines_into_br_tags() {
    let rendered = DefaultVerbatimSerializer.render(Some("text"), "\n\nfoo");
    assert_eq!(
        rendered,
        "<pre><code class=\"text\"><br/><br/>foo</code></pre>"
    );
}

struct UppercaseSerializer;

impl VerbatimSerializer for UppercaseSerializer {
    fn render(&self, language: Option<&str>, literal: &str) -> String {
        format!(
            "<pre data-lang=\"{}\">{}</pre>",
            language.unwrap_or(""),
            literal.to_uppercase()
        )
    }
}

#[test]
fn resolve_prefers_exact_language_match_over_default_sentinel() {
    let serializers = verbatim::map_of(vec![
        ("rust", std::sync::Arc::new(UppercaseSerializer)),
    ]);
    let resolved = verbatim::resolve(&serializers, Some("rust"));
    assert_eq!(resolved.render(Some("rust"), "hi"), "<pre data-lang=\"rust\">HI</pre>");
}

#[test]
fn resolve_falls_back_to_default_serializer_on_unregistered_language() {
    let serializers = verbatim::map_of(vec![
        ("rust", std::sync::Arc::new(UppercaseSerializer)),
    ]);
    let resolved = verbatim::resolve(&serializers, Some("python"));
    assert_eq!(resolved.render(Some("python"), "hi"), "<pre><code class=\"python\">hi</code></pre>");
}

#[test]
fn resolve_with_no_language_and_no_registered_serializers_uses_default() {
    let serializers = Vec::new();
    let resolved = verbatim::resolve(&serializers, None);
    assert_eq!(resolved.render(None, "hi"), "<pre><code>hi</code></pre>");
}
