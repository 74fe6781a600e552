use super::*;

#[test]
fn explicit_link_with_title() {
    html(
        "[x](http://e \"title\")\n",
        "<p><a href=\"http://e\" title=\"title\">x</a></p>\n",
    );
}

#[test]
fn explicit_link_without_title() {
    html("[x](http://e)\n", "<p><a href=\"http://e\">x</a></p>\n");
}

#[test]
fn reference_link_label_is_normalized_to_lowercase() {
    html(
        concat!("[x][Y]\n", "\n", "[y]: http://e\n"),
        "<p><a href=\"http://e\">x</a></p>\n",
    );
}

#[test]
fn unresolved_reference_falls_back_to_literal_brackets() {
    html("[x][nope]\n", "<p>[x][nope]</p>\n");
}

#[test]
fn explicit_image() {
    html(
        "![alt](http://img \"title\")\n",
        "<p><img src=\"http://img\" alt=\"alt\" title=\"title\"/></p>\n",
    );
}

#[test]
fn autolink_renders_anchor_with_literal_url_as_text() {
    html(
        "Visit <http://example.com> now.\n",
        "<p>Visit <a href=\"http://example.com\">http://example.com</a> now.</p>\n",
    );
}

#[test]
fn mail_autolink_is_obfuscated() {
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let out = processor.markdown_to_html("<user@example.com>\n").expect("markdown_to_html");
    assert!(out.starts_with("<p><a href=\"mailto:"), "unexpected prefix: {out}");
    assert!(
        !out.contains("mailto:user@example.com\""),
        "the address must not appear in the clear in the href: {out}"
    );
    assert!(out.contains("&#"), "expected numeric character references in the obfuscated output: {out}");
}

#[test]
fn wikilink_bare_page_name() {
    html_ext(
        "[[Page Name]]\n",
        "<p><a href=\"Page-Name.html\">Page Name</a></p>\n",
        |e| e.wikilinks = true,
    );
}

#[test]
fn wikilink_with_display_text() {
    html_ext(
        "[[Page|Text]]\n",
        "<p><a href=\"Page.html\">Text</a></p>\n",
        |e| e.wikilinks = true,
    );
}

#[test]
fn wikilinks_extension_off_leaves_double_brackets_literal() {
    html("[[Page Name]]\n", "<p>[[Page Name]]</p>\n");
}
