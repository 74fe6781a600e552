//! Test aggregator: one file per concern under `src/tests/`, plus the
//! shared `html`/`html_ext` helpers every concern file builds on.

mod abbreviations;
mod core;
mod determinism;
mod emphasis;
mod footnotes;
mod headings;
mod links;
mod lists;
mod seed_scenarios;
mod tables;
mod verbatim;

use pretty_assertions::assert_eq;

use crate::{Extensions, Plugins, Processor};

/// Renders `source` under default extensions and asserts the HTML matches
/// `expected` exactly.
fn html(source: &str, expected: &str) {
    let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
    let actual = processor.markdown_to_html(source).expect("markdown_to_html");
    assert_eq!(actual, expected);
}

/// Renders `source` under extensions customized by `configure`, asserting
/// the HTML matches `expected` exactly.
fn html_ext(source: &str, expected: &str, configure: impl FnOnce(&mut Extensions)) {
    let mut extensions = Extensions::default();
    configure(&mut extensions);
    let mut processor = Processor::new(extensions, 2000, Plugins::default());
    let actual = processor.markdown_to_html(source).expect("markdown_to_html");
    assert_eq!(actual, expected);
}
