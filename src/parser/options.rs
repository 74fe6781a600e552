//! Configuration for the parser and renderer, mirroring the teacher's
//! `Options { extension, parse, render }` split (its source is
//! `parser/options.rs`).

use std::sync::Arc;

use crate::link_renderer::LinkRenderer;
use crate::plugins::{BlockPlugin, HeaderIdComputer, InlinePlugin, SerializerPlugin};
use crate::verbatim::VerbatimSerializer;

/// The full extension bitset (§6.2), one field per independent bit.
/// `smartypants` is a convenience alias expanded by [`Extensions::smartypants`]
/// rather than stored as its own bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extensions {
    pub smarts: bool,
    pub quotes: bool,
    pub abbreviations: bool,
    pub hardwraps: bool,
    pub autolinks: bool,
    pub tables: bool,
    pub definitions: bool,
    pub fenced_code_blocks: bool,
    pub html_block_suppress: bool,
    pub inline_html_suppress: bool,
    pub wikilinks: bool,
    pub strikethrough: bool,
    pub anchor_links: bool,
    pub atx_header_space: bool,
    pub force_list_item_para: bool,
    pub relaxed_hrules: bool,
    pub tasklistitems: bool,
    pub ext_anchor_links: bool,
    pub ext_anchor_links_wrap: bool,
    pub toc: bool,
    pub dummy_reference_key: bool,
    pub multi_line_image_urls: bool,
    pub relaxed_strong_emphasis_rules: bool,
    pub footnotes: bool,
    pub intellij_dummy_identifier: bool,
}

impl Extensions {
    /// Sets both `smarts` and `quotes`, the `smartypants` convenience alias
    /// (§6.2).
    ///
    /// ```
    /// # use markweave::Extensions;
    /// let mut ext = Extensions::default();
    /// ext.smartypants(true);
    /// assert!(ext.smarts && ext.quotes);
    /// ```
    pub fn smartypants(&mut self, on: bool) {
        self.smarts = on;
        self.quotes = on;
    }
}

/// Parse-time-only options that aren't strictly extension bits (e.g. the
/// parsing deadline). Kept separate from [`Extensions`] the way the teacher
/// keeps `Parse` separate from `Extension`.
#[derive(Debug, Clone, Copy)]
pub struct Parse {
    /// §4.1.4 / §6.2: abort with [`crate::Error::Timeout`] if parsing a
    /// single document takes longer than this. Default 2000ms (§6.1).
    pub max_parsing_time_ms: u64,
}

impl Default for Parse {
    fn default() -> Self {
        Parse {
            max_parsing_time_ms: 2000,
        }
    }
}

/// Render-time strategy hooks (§4.6, §6.3). Each is a trait object so
/// callers may subclass the default the way the teacher's
/// `SyntaxHighlighterAdapter` plugins do.
#[derive(Clone, Default)]
pub struct Plugins {
    pub link_renderer: Option<Arc<dyn LinkRenderer>>,
    pub verbatim_serializers: Vec<(String, Arc<dyn VerbatimSerializer>)>,
    pub inline_plugins: Vec<Arc<dyn InlinePlugin>>,
    pub block_plugins: Vec<Arc<dyn BlockPlugin>>,
    pub serializer_plugins: Vec<Arc<dyn SerializerPlugin>>,
    pub header_id_computer: Option<Arc<dyn HeaderIdComputer>>,
}

impl std::fmt::Debug for Plugins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("link_renderer", &self.link_renderer.is_some())
            .field("verbatim_serializers", &self.verbatim_serializers.len())
            .field("inline_plugins", &self.inline_plugins.len())
            .field("block_plugins", &self.block_plugins.len())
            .field("serializer_plugins", &self.serializer_plugins.len())
            .field("header_id_computer", &self.header_id_computer.is_some())
            .finish()
    }
}

/// Umbrella options struct, mirroring the teacher's `Options<'c>`.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub extension: Extensions,
    pub parse: Parse,
}
