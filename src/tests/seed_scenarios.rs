//! One test per seed scenario, named for direct traceability back to its
//! scenario number.

use super::*;
use crate::nodes::NodeValue;

#[test]
fn seed_scenario_1_heading_anchor_wrap_toggle() {
    html_ext(
        "# H1\n",
        "<h1><a name=\"h1\"></a>H1</h1>\n",
        |e| e.ext_anchor_links = true,
    );
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
fn seed_scenario_2_relaxed_strong_emphasis_rules_after_code_span() {
    html("`x`_y_\n", "<p><code>x</code>_y_</p>\n");
    html_ext("`x`_y_\n", "<p><code>x</code><em>y</em></p>\n", |e| {
        e.relaxed_strong_emphasis_rules = true;
    });
}

#[test]
fn seed_scenario_3_footnote_numbering_follows_first_reference_order() {
    html_ext(
        concat!("A[^a] B[^b]\n", "\n", "[^b]: bee\n", "[^a]: ay\n"),
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
fn seed_scenario_4_table_column_alignment() {
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
fn seed_scenario_5_reference_label_normalization_is_case_insensitive() {
    html(
        concat!("[x][Y]\n", "\n", "[y]: http://e\n"),
        "<p><a href=\"http://e\">x</a></p>\n",
    );
}

#[test]
fn seed_scenario_6_nested_block_quote_preserves_original_source_indices() {
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let root = processor.parse("> a\n> > b\n> c\n").expect("parse");

    assert_eq!(root.children.len(), 1);
    let outer_bq = &root.children[0];
    assert!(matches!(outer_bq.value, NodeValue::BlockQuote));
    assert_eq!(outer_bq.children.len(), 3);

    assert!(matches!(outer_bq.children[0].value, NodeValue::Para));

    let inner_bq = &outer_bq.children[1];
    assert!(matches!(inner_bq.value, NodeValue::BlockQuote));
    assert_eq!(inner_bq.children.len(), 1);
    let inner_para = &inner_bq.children[0];
    assert!(matches!(inner_para.value, NodeValue::Para));
    let inner_text = &inner_para.children[0];
    match &inner_text.value {
        NodeValue::Text(t) => assert_eq!(t, "b"),
        other => panic!("expected Text(\"b\"), got {other:?}"),
    }
    assert_eq!(
        inner_text.start_index, 8,
        "nested block quote text must keep its offset into the original source"
    );

    assert!(matches!(outer_bq.children[2].value, NodeValue::Para));
}
