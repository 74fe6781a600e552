use super::*;

#[test]
fn abbreviation_expands_on_word_boundary() {
    html_ext(
        concat!("*[HTML]: Hyper Text Markup Language\n", "\n", "HTML is great.\n"),
        "<p><abbr title=\"Hyper Text Markup Language\">HTML</abbr> is great.</p>\n",
        |e| e.abbreviations = true,
    );
}

#[test]
fn abbreviation_does_not_match_inside_a_larger_word() {
    html_ext(
        concat!("*[ID]: Identifier\n", "\n", "VALID text.\n"),
        "<p>VALID text.</p>\n",
        |e| e.abbreviations = true,
    );
}

#[test]
fn abbreviations_extension_off_leaves_definition_as_paragraph_text() {
    html(
        concat!("*[HTML]: Hyper Text Markup Language\n", "\n", "HTML is great.\n"),
        concat!(
            "<p>*[HTML]: Hyper Text Markup Language</p>\n",
            "<p>HTML is great.</p>\n",
        ),
    );
}
