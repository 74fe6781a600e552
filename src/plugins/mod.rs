//! Plugin traits (§6.3), grounded on the teacher's adapter-trait pattern
//! (`src/adapters.rs`): small, focused traits a caller implements to extend
//! one seam of the grammar or serializer.

#[cfg(feature = "syntect-highlighter")]
pub mod syntect;

use crate::nodes::AstNode;

/// Contributes additional alternatives to the inline rule set (§4.1, §6.3).
/// `try_parse` is offered the remaining input at the current inline
/// position and returns the number of bytes consumed plus the node to
/// splice in, or `None` to decline. A plugin producing a node kind the
/// built-in serializer has no case for should return
/// [`crate::nodes::NodeValue::Plugin`] with `is_block: false` and pair it
/// with a [`SerializerPlugin`] registered in the same [`crate::Processor`].
pub trait InlinePlugin: Send + Sync {
    /// Characters that should additionally break a run of plain text and
    /// trigger a call to [`InlinePlugin::try_parse`].
    fn trigger_chars(&self) -> &[char];

    fn try_parse<'a>(&self, remaining: &str) -> Option<(usize, crate::nodes::NodeValue)>;
}

/// Contributes additional alternatives to the block rule set (§4.1, §6.3).
pub trait BlockPlugin: Send + Sync {
    /// Whether this plugin's block can open given the current line (with
    /// leading indent/marker already stripped by the caller).
    fn try_open(&self, line: &str) -> bool;

    /// Consumes as many subsequent lines as this block owns, returning the
    /// node to splice in and the number of lines consumed. As with
    /// [`InlinePlugin`], an unrecognized kind should be
    /// [`crate::nodes::NodeValue::Plugin`] with `is_block: true`.
    fn parse<'a>(&self, lines: &[&str]) -> (crate::nodes::NodeValue, usize);
}

/// Serializer fallback (§4.3, §6.3): given a node the built-in serializer
/// does not recognize, each registered plugin is offered a chance to emit.
/// The first acceptor wins; if none accept, serialization fails with
/// [`crate::Error::UnknownNode`].
pub trait SerializerPlugin: Send + Sync {
    fn try_render<'a>(&self, node: &'a AstNode<'a>, output: &mut String) -> bool;
}

/// Given a heading node, any pre-existing anchor child, and the text
/// derived for it, returns the final anchor id. An empty return means "no
/// id, and strip any anchor child" (§4.3, §6.3).
pub trait HeaderIdComputer: Send + Sync {
    fn compute_id(&self, level: u8, derived_text: &str) -> String;
}
