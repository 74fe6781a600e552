//! The serializer's mutable state, ported from the teacher's
//! `html/context.rs`: an output sink wrapped with last-was-linefeed
//! tracking, plus the transient maps §4.3 says are built or consulted
//! during traversal.

use std::cell::Cell;
use std::fmt::{self, Write};

use rustc_hash::FxHashMap;

use crate::html::anchorizer::Anchorizer;
use crate::nodes::{Abbreviation, Reference};
use crate::parser::options::{Extensions, Plugins};

pub struct Context<'o> {
    output: &'o mut dyn Write,
    last_was_lf: Cell<bool>,

    pub extension: &'o Extensions,
    pub plugins: &'o Plugins,

    /// reference label (normalized) -> Reference node (§4.3).
    pub references: FxHashMap<String, Reference>,
    /// abbreviation text -> expansion (§4.3).
    pub abbreviations: FxHashMap<String, Abbreviation>,
    /// footnote label -> 1-based number, assigned in first-reference order.
    pub referenced_footnotes: FxHashMap<String, u32>,
    /// heading start-index -> anchor id, precomputed before any HTML is
    /// emitted (§4.3 "Heading anchor ids").
    pub header_anchor_ids: FxHashMap<usize, String>,

    pub anchorizer: Anchorizer,

    /// Set by [`crate::html::render_node`] when a [`crate::nodes::NodeValue::Plugin`]
    /// node reaches serialization with no `SerializerPlugin` willing to
    /// render it (§7 "Unknown node at serialization"). Checked once after
    /// the whole tree is traversed so `format_document` can surface
    /// [`crate::Error::UnknownNode`] instead of silently dropping the node.
    pub unknown_node: Cell<Option<&'static str>>,
}

impl<'o> Context<'o> {
    pub fn new(output: &'o mut dyn Write, extension: &'o Extensions, plugins: &'o Plugins) -> Self {
        Context {
            output,
            last_was_lf: Cell::new(true),
            extension,
            plugins,
            references: FxHashMap::default(),
            abbreviations: FxHashMap::default(),
            referenced_footnotes: FxHashMap::default(),
            header_anchor_ids: FxHashMap::default(),
            anchorizer: Anchorizer::new(),
            unknown_node: Cell::new(None),
        }
    }

    /// Ensures output is at the start of a new line, writing one `\n` if
    /// the last byte written was not already a linefeed.
    pub fn cr(&mut self) -> fmt::Result {
        if !self.last_was_lf.get() {
            self.write_str("\n")?;
        }
        Ok(())
    }

    pub fn escape(&mut self, s: &str) -> fmt::Result {
        let escaped = crate::html::escape(s);
        self.write_str(&escaped)
    }

    pub fn escape_href(&mut self, s: &str) -> fmt::Result {
        let escaped = crate::html::escape_href(s);
        self.write_str(&escaped)
    }

    /// Assigns the next footnote number to `label` if it hasn't been seen
    /// yet, in first-reference order (§4.3 "Footnotes").
    pub fn footnote_number(&mut self, label: &str) -> u32 {
        let next = self.referenced_footnotes.len() as u32 + 1;
        *self.referenced_footnotes.entry(label.to_string()).or_insert(next)
    }
}

impl<'o> Write for Context<'o> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(last) = s.bytes().last() {
            self.last_was_lf.set(last == b'\n');
        }
        self.output.write_str(s)
    }
}

impl<'o> fmt::Debug for Context<'o> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<markweave::html::Context>")
    }
}
