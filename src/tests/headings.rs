use super::*;

#[test]
fn atx_heading_levels() {
    html("# One\n", "<h1>One</h1>\n");
    html("###### Six\n", "<h6>Six</h6>\n");
}

#[test]
fn atx_heading_with_too_many_hashes_is_not_a_heading() {
    html("####### Seven\n", "<p>####### Seven</p>\n");
}

#[test]
fn atx_heading_trailing_hashes_are_stripped() {
    html("## Title ##\n", "<h2>Title</h2>\n");
}

#[test]
fn atx_header_space_not_required_by_default() {
    html("#Title\n", "<h1>Title</h1>\n");
}

#[test]
fn atx_header_space_extension_requires_a_space() {
    html_ext("#Title\n", "<p>#Title</p>\n", |e| e.atx_header_space = true);
}

#[test]
fn setext_headings() {
    html("Title\n===\n", "<h1>Title</h1>\n");
    html("Title\n---\n", "<h2>Title</h2>\n");
}

#[test]
fn ext_anchor_links_without_wrap() {
    html_ext(
        "# H1\n",
        "<h1><a name=\"h1\"></a>H1</h1>\n",
        |e| e.ext_anchor_links = true,
    );
}

#[test]
fn ext_anchor_links_with_wrap() {
    html_ext(
        "# H1\n",
        "<h1><a name=\"h1\">H1</a></h1>\n",
        |e| {
            e.ext_anchor_links = true;
            e.ext_anchor_links_wrap = true;
        },
    );
}

#[test]
fn simple_anchor_links_mode() {
    html_ext(
        "# Hello, World\n",
        "<h1><a name=\"Hello\"></a>Hello, World</h1>\n",
        |e| e.anchor_links = true,
    );
}

#[test]
fn heading_without_any_anchor_extension_has_no_anchor() {
    html("# Plain\n", "<h1>Plain</h1>\n");
}
