use super::*;

#[test]
fn single_star_is_emphasis() {
    html("*foo*\n", "<p><em>foo</em></p>\n");
}

#[test]
fn single_underscore_is_emphasis() {
    html("_foo_\n", "<p><em>foo</em></p>\n");
}

#[test]
fn double_star_is_strong() {
    html("**foo**\n", "<p><strong>foo</strong></p>\n");
}

#[test]
fn triple_star_steals_close_for_strong_wrapping_emphasis() {
    html("***foo***\n", "<p><strong><em>foo</em></strong></p>\n");
}

#[test]
fn unclosed_strike_is_literal() {
    html_ext("~~foo\n", "<p>~~foo</p>\n", |e| e.strikethrough = true);
}

#[test]
fn closed_strike_renders_del() {
    html_ext("~~del~~\n", "<p><del>del</del></p>\n", |e| e.strikethrough = true);
}

#[test]
fn relaxed_strong_emphasis_rules_off_leaves_underscore_after_code_literal() {
    html("`x`_y_\n", "<p><code>x</code>_y_</p>\n");
}

#[test]
fn relaxed_strong_emphasis_rules_on_allows_underscore_after_code() {
    html_ext("`x`_y_\n", "<p><code>x</code><em>y</em></p>\n", |e| {
        e.relaxed_strong_emphasis_rules = true;
    });
}

#[test]
fn emphasis_inside_word_is_not_entered_without_relaxed_rules() {
    html("foo_bar_baz\n", "<p>foo_bar_baz</p>\n");
}
