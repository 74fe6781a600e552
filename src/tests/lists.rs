use super::*;

#[test]
fn tight_bullet_list() {
    html("- a\n- b\n", "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn loose_bullet_list_wraps_items_in_paragraphs() {
    html(
        "- a\n\n- b\n",
        "<ul>\n<li><p>a</p>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn tight_ordered_list() {
    html("1. a\n2. b\n", "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n");
}

#[test]
fn ordered_list_with_non_one_start() {
    html(
        "3. a\n4. b\n",
        "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n",
    );
}

#[test]
fn tasklistitems_extension_renders_checkboxes() {
    html_ext(
        "- [x] done\n- [ ] todo\n",
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" disabled=\"\" checked=\"\"/> done</li>\n",
            "<li><input type=\"checkbox\" disabled=\"\"/> todo</li>\n",
            "</ul>\n",
        ),
        |e| e.tasklistitems = true,
    );
}

#[test]
fn tasklistitems_extension_off_leaves_brackets_as_text() {
    html(
        "- [x] done\n",
        "<ul>\n<li>[x] done</li>\n</ul>\n",
    );
}

#[test]
fn nested_bullet_list() {
    html(
        "- a\n  - b\n",
        concat!(
            "<ul>\n",
            "<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n",
            "</ul>\n",
        ),
    );
}
