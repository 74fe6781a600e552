use super::*;

#[test]
fn basic_paragraphs_and_blockquote() {
    html(
        concat!(
            "My **document**.\n",
            "\n",
            "It's mine.\n",
            "\n",
            "> Yes.\n",
            "\n",
            "## Hi!\n",
            "\n",
            "Okay.\n",
        ),
        concat!(
            "<p>My <strong>document</strong>.</p>\n",
            "<p>It's mine.</p>\n",
            "<blockquote>\n",
            "<p>Yes.</p>\n",
            "</blockquote>\n",
            "<h2>Hi!</h2>\n",
            "<p>Okay.</p>\n",
        ),
    );
}

#[test]
fn empty_input_renders_nothing() {
    html("", "");
}

#[test]
fn horizontal_rule() {
    html("a\n\n---\n\nb\n", "<p>a</p>\n<hr/>\n<p>b</p>\n");
}

#[test]
fn unclosed_emphasis_is_literal() {
    html("*foo", "<p>*foo</p>\n");
}

#[test]
fn fence_length_mismatch_does_not_close_on_shorter_fence() {
    html_ext(
        "```\ncode\n```` still code\n```\n",
        "<pre><code>code\n```` still code\n</code></pre>\n",
        |e| e.fenced_code_blocks = true,
    );
}

#[test]
fn setext_single_hyphen_does_not_form_heading() {
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let out = processor.markdown_to_html("Title\n-\n").expect("markdown_to_html");
    assert!(!out.contains("<h2>"), "a lone `-` must not form a setext heading: {out}");
}
