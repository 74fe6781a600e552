//! Testable properties from the boundary-cases and quantified-invariants
//! list: determinism, normalization idempotence, index ordering, and Text
//! coalescence.

use super::*;
use crate::nodes::NodeValue;
use crate::strings::normalize_reference_label;
use crate::Root;

fn walk_checking_invariants(node: &Root, source_len: usize) {
    assert!(node.start_index <= node.end_index);
    assert!(node.end_index <= source_len);

    let mut prev_end = 0;
    let mut prev_was_text = false;
    for child in &node.children {
        assert!(
            prev_end <= child.start_index,
            "sibling overlap: prior sibling ended at {prev_end}, next starts at {}",
            child.start_index
        );
        prev_end = child.end_index;

        let is_text = matches!(child.value, NodeValue::Text(_));
        assert!(
            !(is_text && prev_was_text),
            "two adjacent Text siblings were not coalesced"
        );
        prev_was_text = is_text;

        walk_checking_invariants(child, source_len);
    }
}

#[test]
fn reparsing_the_same_source_yields_structurally_identical_trees() {
    let source = "# Title\n\nSome *emphasis* and a [link](http://e).\n\n> Quoted.\n";
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let first = processor.parse(source).expect("first parse");
    let second = processor.parse(source).expect("second parse");
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn index_ordering_and_text_coalescence_hold_across_a_mixed_document() {
    let source = concat!(
        "# Title\n",
        "\n",
        "A paragraph with *emphasis*, `code`, and a [link](http://e).\n",
        "\n",
        "> Nested.\n",
        "> > Deeper.\n",
        "\n",
        "- one\n",
        "- two\n",
    );
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let root = processor.parse(source).expect("parse");
    walk_checking_invariants(&root, source.chars().count());
}

#[test]
fn normalize_reference_label_is_idempotent() {
    let once = normalize_reference_label(" Foo BAR \n");
    let twice = normalize_reference_label(&once);
    assert_eq!(once, twice);
}

#[test]
fn normalize_reference_label_lowercases_and_strips_whitespace() {
    assert_eq!(normalize_reference_label(" Foo BAR \n"), "foobar");
}

#[test]
fn empty_input_produces_an_empty_root_with_no_children() {
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let root = processor.parse("").expect("parse");
    assert!(matches!(root.value, NodeValue::Root));
    assert!(root.children.is_empty());
}

#[test]
fn toc_only_input_with_no_headings_renders_an_empty_list() {
    html_ext("[TOC]\n", "<ul>\n</ul>\n", |e| e.toc = true);
}
