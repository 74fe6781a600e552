use super::*;

#[test]
fn footnote_numbering_follows_first_reference_order() {
    html_ext(
        concat!(
            "A[^a] B[^b]\n",
            "\n",
            "[^b]: bee\n",
            "[^a]: ay\n",
        ),
        concat!(
            "<p>A<sup id=\"fnref-1\"><a href=\"#fn-1\">1</a></sup> ",
            "B<sup id=\"fnref-2\"><a href=\"#fn-2\">2</a></sup></p>\n",
            "<div class=\"footnotes\"><hr/><ol>\n",
            "<li id=\"fn-1\">ay</li>\n",
            "<li id=\"fn-2\">bee</li>\n",
            "</ol></div>\n",
        ),
        |e| e.footnotes = true,
    );
}

#[test]
fn unreferenced_footnote_definitions_are_omitted() {
    html_ext(
        concat!(
            "A[^a]\n",
            "\n",
            "[^a]: one\n",
            "[^b]: two\n",
        ),
        concat!(
            "<p>A<sup id=\"fnref-1\"><a href=\"#fn-1\">1</a></sup></p>\n",
            "<div class=\"footnotes\"><hr/><ol>\n",
            "<li id=\"fn-1\">one</li>\n",
            "</ol></div>\n",
        ),
        |e| e.footnotes = true,
    );
}

#[test]
fn without_any_footnote_reference_no_footnotes_div_is_emitted() {
    html_ext(
        "[^a]: unused\n",
        "",
        |e| e.footnotes = true,
    );
}

#[test]
fn footnotes_extension_off_treats_caret_bracket_as_an_unresolved_reference() {
    html("A[^a]\n", "<p>A[^a]</p>\n");
}
