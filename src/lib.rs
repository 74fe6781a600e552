//! A pluggable Markdown document processor (§1): parses a Markdown source
//! string into a tree of typed document nodes under a fixed,
//! user-selectable extension set, then renders that tree to HTML through a
//! pluggable link renderer and verbatim-block serializer.
//!
//! The [`Processor`] façade (§6.1) is the entry point most callers need:
//!
//! ```
//! use markweave::{Extensions, Plugins, Processor};
//!
//! let mut processor = Processor::new(Extensions::default(), 2000, Plugins::default());
//! let html = processor.markdown_to_html("# Hello\n\nWorld.\n").unwrap();
//! assert!(html.contains("<h1>Hello</h1>"));
//! ```

mod arena_tree;
mod character_set;
mod ctype;
mod entity;
mod error;
pub mod html;
mod link_renderer;
pub mod nodes;
pub mod parser;
pub mod plugins;
mod scanners;
mod strings;
pub mod verbatim;

#[cfg(test)]
mod tests;

pub use crate::error::Error;
pub use crate::link_renderer::{DefaultLinkRenderer, LinkRenderer, Rendering};
pub use crate::nodes::{NodeValue, Tables};
pub use crate::parser::{Extensions, Options, Parse, Plugins};
pub use crate::plugins::{BlockPlugin, HeaderIdComputer, InlinePlugin, SerializerPlugin};
pub use crate::verbatim::{DefaultVerbatimSerializer, VerbatimSerializer};

use typed_arena::Arena;

use crate::nodes::AstNode;

/// An owned, arena-free materialization of a parsed document tree (§6.1
/// `Processor::parse`). [`parser::parse_document`] produces an
/// arena-allocated `&AstNode`, whose lifetime is tied to the arena that
/// backs it; since that arena is local to a single `parse` call, `Root`
/// clones each node's value out of the arena once, up front, so the
/// returned tree can outlive the call that produced it. Only the outermost
/// `Root` node carries non-empty `tables` (§3.1), matching
/// [`nodes::Ast::tables`].
#[derive(Debug, Clone)]
pub struct Root {
    pub value: NodeValue,
    pub start_index: usize,
    pub end_index: usize,
    pub tables: Tables,
    pub children: Vec<Root>,
}

fn materialize<'a>(node: &'a AstNode<'a>) -> Root {
    let ast = node.data.borrow();
    Root {
        value: ast.value.clone(),
        start_index: ast.start_index,
        end_index: ast.end_index,
        tables: ast.tables.clone(),
        children: node.children().map(materialize).collect(),
    }
}

/// Owns the extension/plugin configuration for repeated parse/render calls
/// (§6.1). Each call builds its own arena internally; nothing is retained
/// between calls.
#[derive(Debug, Clone)]
pub struct Processor {
    extensions: Extensions,
    max_parsing_time_ms: u64,
    plugins: Plugins,
}

impl Default for Processor {
    fn default() -> Self {
        Processor::new(Extensions::default(), Parse::default().max_parsing_time_ms, Plugins::default())
    }
}

impl Processor {
    pub fn new(extensions: Extensions, max_parsing_time_ms: u64, plugins: Plugins) -> Processor {
        Processor {
            extensions,
            max_parsing_time_ms,
            plugins,
        }
    }

    /// Parses `source` into an owned [`Root`] tree (§6.1).
    pub fn parse(&mut self, source: &str) -> Result<Root, Error> {
        let arena = Arena::new();
        let root = parser::parse_document(&arena, source, &self.extensions, &self.plugins, self.max_parsing_time_ms)?;
        Ok(materialize(root))
    }

    /// Parses `source` and renders it straight to HTML (§6.1), consulting
    /// the configured link renderer and verbatim serializers.
    pub fn markdown_to_html(&mut self, source: &str) -> Result<String, Error> {
        let arena = Arena::new();
        let root = parser::parse_document(&arena, source, &self.extensions, &self.plugins, self.max_parsing_time_ms)?;
        html::format_document(root, &self.extensions, &self.plugins)
    }
}
