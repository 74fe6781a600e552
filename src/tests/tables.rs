use super::*;

#[test]
fn table_with_alignment() {
    html_ext(
        concat!("| a | b |\n", "|---|--:|\n", "| 1 | 2 |\n"),
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr><th>a</th><th align=\"right\">b</th></tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr><td>1</td><td align=\"right\">2</td></tr>\n",
            "</tbody>\n",
            "</table>\n",
        ),
        |e| e.tables = true,
    );
}

#[test]
fn table_cell_colspan_from_trailing_empty_cells() {
    html_ext(
        concat!("| a | b | c |\n", "|---|---|---|\n", "| 1 |  |  |\n"),
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr><th>a</th><th>b</th><th>c</th></tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr><td colspan=\"3\">1</td></tr>\n",
            "</tbody>\n",
            "</table>\n",
        ),
        |e| e.tables = true,
    );
}

#[test]
fn tables_extension_off_leaves_pipes_as_paragraph_text() {
    html(
        concat!("| a | b |\n", "|---|---|\n"),
        concat!("<p>| a | b | |---|---|</p>\n"),
    );
}
