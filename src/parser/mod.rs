//! The recursive-descent Markdown parser (§4.1).
//!
//! Organized into the same three altitudes the distilled specification
//! describes: block-level dispatch lives in this module (and
//! [`table`]), the inline grammar lives in [`inlines`], and the leaf-level
//! character classifiers live in [`crate::scanners`]/[`crate::ctype`].
//!
//! Indices throughout are *character* offsets (not byte offsets) into
//! whatever buffer a given [`BlockParser`] owns. For the outermost parse
//! that buffer is the full original source; for a block quote or list item
//! sub-parse (§4.5) it is a throwaway compacted buffer, and the sub-parse's
//! result is `remap`ped back into the outer buffer's coordinates before
//! splicing, so every node a caller ever sees carries indices into the
//! original input, per Invariant 1.

pub mod options;
mod table;

pub use options::{Extensions, Options, Parse, Plugins};

use std::cell::RefCell;
use std::time::{Duration, Instant};

use typed_arena::Arena;

use crate::arena_tree::Node;
use crate::error::Error;
use crate::nodes::{
    self, make_node, Abbreviation, AstNode, FootnoteDefinition, NodeHeading, NodeList,
    NodeReference, NodeTaskListItem, NodeToc, NodeValue, NodeVerbatim, OrderedDelim, Reference,
    Tables,
};
use crate::scanners;

pub(crate) mod inlines;

/// The sentinel character a sub-parse substitutes for masked marker/indent
/// characters (§4.5). It is never produced by conforming UTF-8 text, so it
/// cannot collide with real input.
const MASK_SENTINEL: char = '\u{FFFF}';

/// Parses `source` under `extensions`/`plugins`, aborting with
/// [`Error::Timeout`] if `max_parsing_time_ms` elapses first (0 disables
/// the deadline). This is the entry point `Processor::parse` calls (§6.1).
pub fn parse_document<'a>(
    arena: &'a Arena<AstNode<'a>>,
    source: &str,
    extensions: &Extensions,
    plugins: &Plugins,
    max_parsing_time_ms: u64,
) -> Result<&'a AstNode<'a>, Error> {
    let deadline = Deadline::new(max_parsing_time_ms);
    let chars: Vec<char> = source.chars().collect();
    let total = chars.len();
    let lines = split_lines(&chars);

    let mut bp = BlockParser::new(arena, extensions, plugins, &deadline, &chars);
    let children = bp.parse_blocks(&lines)?;

    let root = bp.alloc(NodeValue::Root, 0, total);
    for child in children {
        root.append(child);
    }
    root.data.borrow_mut().tables = bp.tables;
    Ok(root)
}

/// The parser's only cancellation channel (§4.1.4, §5): a monotonic start
/// time shared across the whole `parse`/`markdown_to_html` call, including
/// every recursive sub-parse it spawns.
pub(crate) struct Deadline {
    start: Instant,
    max_ms: u64,
}

impl Deadline {
    fn new(max_ms: u64) -> Self {
        Deadline {
            start: Instant::now(),
            max_ms,
        }
    }

    /// Polled at entry to `Inline`, `Label`, and `ImageAlt` (§4.1.4).
    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.max_ms > 0 && self.start.elapsed() >= Duration::from_millis(self.max_ms) {
            return Err(Error::Timeout);
        }
        Ok(())
    }
}

/// One logical line of a buffer under parse: `[start, end)` excludes the
/// trailing `\n`; `end_nl` is one past the `\n` itself (or equals `end` at
/// end-of-input with no trailing newline).
#[derive(Debug, Clone)]
struct Line {
    start: usize,
    end: usize,
    end_nl: usize,
    text: String,
}

fn split_lines(chars: &[char]) -> Vec<Line> {
    let mut lines = Vec::new();
    let n = chars.len();
    let mut i = 0;
    while i < n {
        let start = i;
        while i < n && chars[i] != '\n' {
            i += 1;
        }
        let end = i;
        let end_nl = if i < n { i + 1 } else { i };
        lines.push(Line {
            start,
            end,
            end_nl,
            text: chars[start..end].iter().collect(),
        });
        i = end_nl;
    }
    lines
}

fn is_list_marker_line(text: &str) -> bool {
    list_marker(text, false).is_some() || list_marker(text, true).is_some()
}

struct ListMarker {
    /// Characters consumed by the marker plus its trailing separator.
    width: usize,
    bullet_char: u8,
    ordered_delimiter: OrderedDelim,
    start: usize,
    task: Option<bool>,
}

/// Recognizes a list item marker at the front of `text` (§4.1.1 "Lists"):
/// column 0-3 indent, then `-`/`*`/`+` (bullet) or digits followed by
/// `.`/`)` (ordered), then a space or end-of-line. Also recognizes an
/// immediately-following GFM task marker (`[ ]`/`[x]`/`[X]`) when present.
fn list_marker(text: &str, ordered: bool) -> Option<ListMarker> {
    let indent = scanners::leading_indent(text);
    if indent > 3 {
        return None;
    }
    let rest: Vec<char> = text.chars().skip_while(|c| *c == ' ' || *c == '\t').collect();
    if rest.is_empty() {
        return None;
    }
    let (marker_len, bullet_char, delim, start_num) = if ordered {
        let digits: String = rest.iter().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() || digits.len() > 9 {
            return None;
        }
        let after = *rest.get(digits.len())?;
        let delim = match after {
            '.' => OrderedDelim::Period,
            ')' => OrderedDelim::Paren,
            _ => return None,
        };
        (digits.len() + 1, b'0', delim, digits.parse().unwrap_or(1))
    } else {
        let c = *rest.first()?;
        if !matches!(c, '-' | '*' | '+') {
            return None;
        }
        (1, c as u8, OrderedDelim::Period, 1)
    };
    let sep_width = match rest.get(marker_len) {
        None => 0,
        Some(' ') | Some('\t') => 1,
        _ => return None,
    };
    let mut width = indent + marker_len + sep_width;

    // Task list items (§3.1 TaskListItem, `tasklistitems` extension).
    let after_marker: String = rest.iter().skip(marker_len + sep_width).collect();
    let task = if after_marker.len() >= 3 {
        let b: Vec<char> = after_marker.chars().collect();
        if b[0] == '[' && (b[1] == ' ' || b[1] == 'x' || b[1] == 'X') && b[2] == ']' {
            width += 3 + if b.get(3) == Some(&' ') { 1 } else { 0 };
            Some(b[1] != ' ')
        } else {
            None
        }
    } else {
        None
    };

    Some(ListMarker {
        width,
        bullet_char,
        ordered_delimiter: delim,
        start: start_num,
        task,
    })
}

/// Strips up to `cols` indent columns (tabs expanding to the next multiple
/// of 4) from the front of `text`, returning the remainder.
fn strip_indent_columns(text: &str, cols: usize) -> String {
    let mut col = 0;
    let mut out: Vec<char> = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if col >= cols {
            break;
        }
        match c {
            ' ' => {
                col += 1;
                chars.next();
            }
            '\t' => {
                col += 4 - (col % 4);
                chars.next();
            }
            _ => break,
        }
    }
    out.extend(chars);
    out.into_iter().collect()
}

/// Replaces masked (`MASK_SENTINEL`) characters, returning the compacted
/// buffer and `ix_map[compacted_index] == original_index` (§4.5).
fn compact(masked: &[char], origin: &[usize]) -> (Vec<char>, Vec<usize>) {
    let mut out_chars = Vec::with_capacity(masked.len());
    let mut out_map = Vec::with_capacity(masked.len());
    for (i, &c) in masked.iter().enumerate() {
        if c != MASK_SENTINEL {
            out_chars.push(c);
            out_map.push(origin[i]);
        }
    }
    (out_chars, out_map)
}

/// Owns one altitude of recursion through the block grammar: either the
/// outermost document parse, or a throwaway sub-parse spawned by a block
/// quote or list item (§4.5). Each instance has its own [`Tables`]; only
/// the outermost one's tables end up attached to the `Root` node — a
/// sub-parse's tables are discarded (§4.5, §9 Open Questions: reference/
/// footnote/abbreviation definitions inside a block quote or list item are
/// not recognized at top level, by design).
pub(crate) struct BlockParser<'a, 'b> {
    arena: &'a Arena<AstNode<'a>>,
    extensions: &'b Extensions,
    plugins: &'b Plugins,
    deadline: &'b Deadline,
    source: &'b [char],
    tables: Tables,
}

impl<'a, 'b> BlockParser<'a, 'b> {
    fn new(
        arena: &'a Arena<AstNode<'a>>,
        extensions: &'b Extensions,
        plugins: &'b Plugins,
        deadline: &'b Deadline,
        source: &'b [char],
    ) -> Self {
        BlockParser {
            arena,
            extensions,
            plugins,
            deadline,
            source,
            tables: Tables::default(),
        }
    }

    fn alloc(&self, value: NodeValue, start: usize, end: usize) -> &'a AstNode<'a> {
        self.arena.alloc(Node::new(RefCell::new(make_node(value, start, end))))
    }

    /// Parses the inline grammar over `self.source[start..end]`, producing
    /// nodes whose indices are already in this buffer's coordinate system
    /// (true source positions for a contiguous paragraph/heading span; see
    /// module docs for why block quotes/list items need remapping instead).
    fn inline(&self, start: usize, end: usize) -> Result<Vec<&'a AstNode<'a>>, Error> {
        inlines::parse_inline_slice(self.arena, self.extensions, self.plugins, self.deadline, self.source, start, end)
    }

    /// Parses a reconstructed (non-contiguous-with-source) body string —
    /// used for footnote/abbreviation/reference definition bodies, whose
    /// continuation-line stripping breaks the 1:1 offset correspondence
    /// inline parsing relies on elsewhere. Produced node indices are
    /// linearly stamped into `[start, end]` rather than tracked precisely;
    /// see DESIGN.md for this resolved simplification.
    fn inline_text(&self, text: &str, start: usize, end: usize) -> Result<Vec<&'a AstNode<'a>>, Error> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let nodes = inlines::parse_inline_slice(self.arena, self.extensions, self.plugins, self.deadline, &chars, 0, len)?;
        for n in &nodes {
            for d in n.descendants() {
                let mut ast = d.data.borrow_mut();
                ast.start_index = (ast.start_index + start).min(end);
                ast.end_index = (ast.end_index + start).min(end);
            }
        }
        Ok(nodes)
    }

    /// Re-runs the block grammar over a compacted sub-parse buffer,
    /// discarding the nested parser's side tables (§4.5).
    fn reparse(&self, compacted: &[char]) -> Result<Vec<&'a AstNode<'a>>, Error> {
        let mut sub = BlockParser::new(self.arena, self.extensions, self.plugins, self.deadline, compacted);
        let lines = split_lines(compacted);
        sub.parse_blocks(&lines)
    }

    /// Builds the masked buffer for a run of lines whose prefix
    /// `[start, content_start)` should be hidden from the inner parse
    /// (§4.5): prefix positions become [`MASK_SENTINEL`], content
    /// positions (including the line's own newline) are copied verbatim.
    /// Appends a synthetic `"\n\n"` mapped to the final line's end, per
    /// §4.1.1 "Block quote" ("two consecutive terminating newlines are
    /// appended... to ensure a terminating paragraph break") — applied
    /// uniformly to list item sub-parses too, since §4.5 describes the same
    /// mechanism for both.
    fn mask_lines(&self, spans: &[(usize, usize, usize)]) -> (Vec<char>, Vec<usize>) {
        let mut masked = Vec::new();
        let mut origin = Vec::new();
        for &(start, content_start, end_nl) in spans {
            for idx in start..content_start {
                masked.push(MASK_SENTINEL);
                origin.push(idx);
            }
            for idx in content_start..end_nl {
                masked.push(self.source[idx]);
                origin.push(idx);
            }
        }
        let tail = spans[spans.len() - 1].2;
        masked.push('\n');
        origin.push(tail);
        masked.push('\n');
        origin.push(tail);
        (masked, origin)
    }

    /// The top-level `Block` loop (§4.1 "Block altitude"): skip blank
    /// lines, then try each alternative in order until one matches.
    fn parse_blocks(&mut self, lines: &[Line]) -> Result<Vec<&'a AstNode<'a>>, Error> {
        let mut children = Vec::new();
        let mut li = 0;
        while li < lines.len() {
            while li < lines.len() && scanners::is_blank(&lines[li].text) {
                li += 1;
            }
            if li >= lines.len() {
                break;
            }
            let (node, next) = self.try_block(lines, li)?;
            children.push(node);
            li = next;
        }
        Ok(children)
    }

    fn try_block(&mut self, lines: &[Line], li: usize) -> Result<(&'a AstNode<'a>, usize), Error> {
        let block_plugins = self.plugins.block_plugins.clone();
        for plugin in &block_plugins {
            if plugin.try_open(&lines[li].text) {
                let slice: Vec<&str> = lines[li..].iter().map(|l| l.text.as_str()).collect();
                let (value, consumed) = plugin.parse(&slice);
                let consumed = consumed.max(1).min(lines.len() - li);
                let end = lines[li + consumed - 1].end_nl;
                return Ok((self.alloc(value, lines[li].start, end), li + consumed));
            }
        }
        if let Some(r) = self.try_block_quote(lines, li)? {
            return Ok(r);
        }
        if self.extensions.fenced_code_blocks {
            if let Some(r) = self.try_fenced_code(lines, li) {
                return Ok(r);
            }
        }
        if let Some(r) = self.try_indented_verbatim(lines, li) {
            return Ok(r);
        }
        if self.extensions.footnotes {
            if let Some(r) = self.try_footnote_def(lines, li)? {
                return Ok(r);
            }
        }
        if self.extensions.abbreviations {
            if let Some(r) = self.try_abbreviation_def(lines, li) {
                return Ok(r);
            }
        }
        if let Some(r) = self.try_reference_def(lines, li) {
            return Ok(r);
        }
        if let Some(r) = self.try_horizontal_rule(lines, li) {
            return Ok(r);
        }
        if let Some(r) = self.try_heading(lines, li)? {
            return Ok(r);
        }
        if let Some(r) = self.try_list(lines, li, true)? {
            return Ok(r);
        }
        if let Some(r) = self.try_list(lines, li, false)? {
            return Ok(r);
        }
        if let Some(r) = self.try_html_block(lines, li) {
            return Ok(r);
        }
        if self.extensions.tables {
            if let Some(r) = table::try_table(self, lines, li)? {
                return Ok(r);
            }
        }
        if self.extensions.definitions {
            if let Some(r) = self.try_definition_list(lines, li)? {
                return Ok(r);
            }
        }
        if self.extensions.toc {
            if let Some(r) = self.try_toc(lines, li) {
                return Ok(r);
            }
        }
        self.parse_para(lines, li)
    }

    // ---- Block quote (§4.1.1 "Block quote", §4.5) ----

    fn try_block_quote(&mut self, lines: &[Line], li: usize) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
        if scanners::block_quote_marker(&lines[li].text).is_none() {
            return Ok(None);
        }
        let mut spans: Vec<(usize, usize, usize)> = Vec::new();
        let mut j = li;
        loop {
            if j >= lines.len() {
                break;
            }
            if let Some(off) = scanners::block_quote_marker(&lines[j].text) {
                let content_start = (lines[j].start + off).min(lines[j].end);
                spans.push((lines[j].start, content_start, lines[j].end_nl));
                j += 1;
            } else if scanners::is_blank(&lines[j].text) {
                let mut k = j;
                while k < lines.len() && scanners::is_blank(&lines[k].text) {
                    k += 1;
                }
                if k < lines.len() && scanners::block_quote_marker(&lines[k].text).is_some() {
                    for bi in j..k {
                        spans.push((lines[bi].start, lines[bi].start, lines[bi].end_nl));
                    }
                    j = k;
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        if spans.is_empty() {
            return Ok(None);
        }
        let start = spans[0].0;
        let end = spans[spans.len() - 1].2;

        let (masked, origin) = self.mask_lines(&spans);
        let (compacted, ix_map) = compact(&masked, &origin);
        let children = self.reparse(&compacted)?;
        for child in &children {
            nodes::remap_subtree(child, &ix_map);
        }

        let node = self.alloc(NodeValue::BlockQuote, start, end);
        for child in children {
            node.append(child);
        }
        Ok(Some((node, j)))
    }

    // ---- Verbatim: indented (§4.1.1) ----

    fn try_indented_verbatim(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        if scanners::leading_indent(&lines[li].text) < 4 {
            return None;
        }
        let mut j = li;
        let mut body = String::new();
        let mut last = li;
        loop {
            if j >= lines.len() {
                break;
            }
            if scanners::is_blank(&lines[j].text) {
                let mut k = j;
                while k < lines.len() && scanners::is_blank(&lines[k].text) {
                    k += 1;
                }
                if k < lines.len() && scanners::leading_indent(&lines[k].text) >= 4 {
                    for _ in j..k {
                        body.push('\n');
                    }
                    j = k;
                    continue;
                }
                break;
            }
            if scanners::leading_indent(&lines[j].text) < 4 {
                break;
            }
            body.push_str(&strip_indent_columns(&lines[j].text, 4));
            body.push('\n');
            last = j;
            j += 1;
        }
        let node = self.alloc(
            NodeValue::Verbatim(NodeVerbatim { language: None, literal: body }),
            lines[li].start,
            lines[last].end_nl,
        );
        Some((node, j))
    }

    // ---- Verbatim: fenced (§4.1.1 "Fenced code", `fenced-code-blocks`) ----

    fn try_fenced_code(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        let (fence_char, fence_len, info) = scanners::fence_opener(&lines[li].text)?;
        let mut j = li + 1;
        let mut body = String::new();
        let mut closed_at = None;
        while j < lines.len() {
            if scanners::fence_closer(&lines[j].text, fence_char, fence_len) {
                closed_at = Some(j);
                j += 1;
                break;
            }
            body.push_str(&lines[j].text);
            body.push('\n');
            j += 1;
        }
        let end_li = closed_at.unwrap_or_else(|| j.saturating_sub(1).max(li));
        let end = lines[end_li.min(lines.len() - 1)].end_nl;
        let language = if info.is_empty() { None } else { Some(info) };
        let node = self.alloc(NodeValue::Verbatim(NodeVerbatim { language, literal: body }), lines[li].start, end);
        Some((node, j))
    }

    // ---- Footnote definition (`footnotes` extension) ----

    fn try_footnote_def(&mut self, lines: &[Line], li: usize) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
        let text = &lines[li].text;
        let Some(rest) = text.strip_prefix("[^") else {
            return Ok(None);
        };
        let Some((label, after)) = rest.split_once("]:") else {
            return Ok(None);
        };
        if label.is_empty() {
            return Ok(None);
        }
        let mut body = after.trim_start().to_string();
        let mut j = li + 1;
        while j < lines.len() && scanners::leading_indent(&lines[j].text) >= 4 {
            body.push('\n');
            body.push_str(strip_indent_columns(&lines[j].text, 4).trim_end());
            j += 1;
        }
        let start = lines[li].start;
        let end = lines[j - 1].end_nl;
        self.tables.footnotes.insert(
            label.to_string(),
            FootnoteDefinition { label: label.to_string(), start_index: start, end_index: end },
        );
        let node = self.alloc(NodeValue::FootnoteDef(label.to_string()), start, end);
        let children = self.inline_text(&body, start, end)?;
        for c in children {
            node.append(c);
        }
        Ok(Some((node, j)))
    }

    // ---- Abbreviation definition (`abbreviations` extension) ----

    fn try_abbreviation_def(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        if scanners::leading_indent(&lines[li].text) >= 4 {
            return None;
        }
        let trimmed = lines[li].text.trim_start();
        let rest = trimmed.strip_prefix("*[")?;
        let (abbr, after) = rest.split_once("]:")?;
        if abbr.is_empty() {
            return None;
        }
        let expansion = after.trim().to_string();
        let start = lines[li].start;
        let end = lines[li].end_nl;
        self.tables
            .abbreviations
            .insert(abbr.to_string(), Abbreviation { abbr: abbr.to_string(), expansion: expansion.clone() });
        let node = self.alloc(
            NodeValue::Abbreviation(crate::nodes::NodeAbbreviation { abbr: abbr.to_string(), expansion }),
            start,
            end,
        );
        Some((node, li + 1))
    }

    // ---- Reference definition ----

    fn try_reference_def(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        if scanners::leading_indent(&lines[li].text) >= 4 {
            return None;
        }
        let trimmed = lines[li].text.trim_start();
        let rest = trimmed.strip_prefix('[')?;
        let (label, after) = rest.split_once("]:")?;
        if label.is_empty() {
            return None;
        }
        let mut target = after.trim_start().to_string();
        let mut j = li + 1;
        if target.is_empty() && j < lines.len() && !scanners::is_blank(&lines[j].text) {
            target = lines[j].text.trim().to_string();
            j += 1;
        }
        let (url, title) = split_url_title(&target);
        let start = lines[li].start;
        let end = lines[j - 1].end_nl;
        let key = crate::strings::normalize_reference_label(label);
        self.tables
            .references
            .insert(key, Reference { label: label.to_string(), url: url.clone(), title: title.clone() });
        let node = self.alloc(
            NodeValue::Reference(NodeReference { label: label.to_string(), url, title }),
            start,
            end,
        );
        Some((node, j))
    }

    // ---- Horizontal rule ----

    fn try_horizontal_rule(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        if !scanners::thematic_break(&lines[li].text, self.extensions.relaxed_hrules) {
            return None;
        }
        if !self.extensions.relaxed_hrules {
            let next_blank = li + 1 >= lines.len() || scanners::is_blank(&lines[li + 1].text);
            if !next_blank {
                return None;
            }
        }
        Some((self.alloc(NodeValue::HorizontalRule, lines[li].start, lines[li].end_nl), li + 1))
    }

    // ---- Heading: ATX and setext (§4.1.1 "Heading disambiguation") ----

    fn try_heading(&mut self, lines: &[Line], li: usize) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
        if li + 1 < lines.len() && !scanners::is_blank(&lines[li].text) {
            if let Some(level) = scanners::setext_heading_underline(&lines[li + 1].text) {
                let start = lines[li].start;
                let end = lines[li + 1].end_nl;
                let node = self.alloc(NodeValue::Heading(NodeHeading { level, is_toc: false, is_setext: true }), start, end);
                let children = self.inline(lines[li].start, lines[li].end)?;
                for c in children {
                    node.append(c);
                }
                return Ok(Some((node, li + 2)));
            }
        }
        let Some((level, content_off)) = scanners::atx_heading(&lines[li].text, self.extensions.atx_header_space) else {
            return Ok(None);
        };
        let raw: String = lines[li].text.chars().skip(content_off).collect();
        let mut content = raw.trim_end().to_string();
        while content.ends_with('#') {
            content.pop();
        }
        let content = content.trim_end();
        let content_start = (lines[li].start + content_off).min(lines[li].end);
        let content_end = (content_start + content.chars().count()).min(lines[li].end);
        let node = self.alloc(
            NodeValue::Heading(NodeHeading { level, is_toc: false, is_setext: false }),
            lines[li].start,
            lines[li].end_nl,
        );
        let children = self.inline(content_start, content_end)?;
        for c in children {
            node.append(c);
        }
        Ok(Some((node, li + 1)))
    }

    // ---- Lists (§4.1.1 "Lists") ----

    fn try_list(&mut self, lines: &[Line], li: usize, ordered: bool) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
        let Some(first_marker) = list_marker(&lines[li].text, ordered) else {
            return Ok(None);
        };
        let mut j = li;
        let mut items: Vec<(usize, usize, Option<bool>)> = Vec::new();
        let mut any_loose = false;
        loop {
            if j >= lines.len() {
                break;
            }
            if list_marker(&lines[j].text, ordered).is_none() {
                break;
            }
            let marker = list_marker(&lines[j].text, ordered).unwrap();
            let task = if self.extensions.tasklistitems { marker.task } else { None };
            let (end_li, loose_boundary) = Self::consume_item_body(lines, j);
            if loose_boundary {
                any_loose = true;
            }
            items.push((j, end_li, task));
            j = end_li;
            if loose_boundary {
                while j < lines.len() && scanners::is_blank(&lines[j].text) {
                    j += 1;
                }
            }
        }
        if items.is_empty() {
            return Ok(None);
        }
        let start = lines[items[0].0].start;
        let end = lines[items[items.len() - 1].1 - 1].end_nl;
        let list_node = if ordered {
            self.alloc(
                NodeValue::OrderedList(NodeList {
                    tight: !any_loose,
                    start: first_marker.start,
                    ordered_delimiter: first_marker.ordered_delimiter,
                    bullet_char: 0,
                }),
                start,
                end,
            )
        } else {
            self.alloc(
                NodeValue::BulletList(NodeList {
                    tight: !any_loose,
                    start: 0,
                    ordered_delimiter: OrderedDelim::Period,
                    bullet_char: first_marker.bullet_char,
                }),
                start,
                end,
            )
        };
        for (item_start, item_end, task) in items {
            let item_node = self.parse_list_item(lines, item_start, item_end, ordered, !any_loose, task)?;
            list_node.append(item_node);
        }
        Ok(Some((list_node, j)))
    }

    /// Consumes one item's body lines (marker line inclusive) per the rules
    /// in §4.1.1: continuation while non-blank-and-not-a-new-item, or
    /// indented by ≥1; a blank run terminates the item unless the next
    /// non-blank line is indented or itself starts a list item (in which
    /// case looseness — the second return value — is recorded at the
    /// *list* level, decided per list rather than per item, Invariant-
    /// adjacent to §3.2 point 4).
    fn consume_item_body(lines: &[Line], start: usize) -> (usize, bool) {
        let mut k = start + 1;
        loop {
            if k >= lines.len() {
                return (k, false);
            }
            if scanners::is_blank(&lines[k].text) {
                let mut p = k;
                while p < lines.len() && scanners::is_blank(&lines[p].text) {
                    p += 1;
                }
                if p >= lines.len() {
                    return (p, false);
                }
                let indented = scanners::leading_indent(&lines[p].text) >= 1;
                let starts_item = is_list_marker_line(&lines[p].text);
                if starts_item && !indented {
                    return (k, true);
                }
                k = p;
                continue;
            }
            let indented = scanners::leading_indent(&lines[k].text) >= 1;
            let starts_item = is_list_marker_line(&lines[k].text);
            if starts_item && !indented {
                return (k, false);
            }
            k += 1;
        }
    }

    fn parse_list_item(
        &mut self,
        lines: &[Line],
        start_li: usize,
        end_li: usize,
        ordered: bool,
        tight: bool,
        task: Option<bool>,
    ) -> Result<&'a AstNode<'a>, Error> {
        let marker = list_marker(&lines[start_li].text, ordered).unwrap();
        let item_lines = &lines[start_li..end_li];
        let mut spans: Vec<(usize, usize, usize)> = Vec::with_capacity(item_lines.len());
        for (idx, line) in item_lines.iter().enumerate() {
            let content_start = if idx == 0 {
                (line.start + marker.width).min(line.end)
            } else {
                let leading_spaces = line.text.chars().take_while(|c| *c == ' ').count();
                (line.start + leading_spaces.min(marker.width)).min(line.end)
            };
            spans.push((line.start, content_start, line.end_nl));
        }
        let (masked, origin) = self.mask_lines(&spans);
        let (compacted, ix_map) = compact(&masked, &origin);
        let mut children = self.reparse(&compacted)?;
        for child in &children {
            nodes::remap_subtree(child, &ix_map);
        }

        // Invariant 4: wrap the first grandchild in a Para iff loose or
        // `force-list-item-para` requires it.
        if (!tight || self.extensions.force_list_item_para) && !children.is_empty() {
            let is_para = matches!(children[0].data.borrow().value, NodeValue::Para);
            if !is_para {
                let first = children[0];
                let (s, e) = {
                    let a = first.data.borrow();
                    (a.start_index, a.end_index)
                };
                let para = self.alloc(NodeValue::Para, s, e);
                first.detach();
                para.append(first);
                children[0] = para;
            }
        }

        let start = lines[start_li].start;
        let end = lines[end_li - 1].end_nl;
        let item_node = match task {
            Some(done) => self.alloc(
                NodeValue::TaskListItem(NodeTaskListItem {
                    done,
                    marker: if done { "[x]".to_string() } else { "[ ]".to_string() },
                }),
                start,
                end,
            ),
            None => self.alloc(NodeValue::ListItem, start, end),
        };
        for child in children {
            item_node.append(child);
        }
        Ok(item_node)
    }

    // ---- HTML block ----

    fn try_html_block(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        let t = lines[li].text.trim_start();
        if !t.starts_with('<') {
            return None;
        }
        let c = t.chars().nth(1)?;
        if !(c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?') {
            return None;
        }
        let mut j = li;
        let mut body = String::new();
        while j < lines.len() && !scanners::is_blank(&lines[j].text) {
            body.push_str(&lines[j].text);
            body.push('\n');
            j += 1;
        }
        let value = if self.extensions.html_block_suppress { String::new() } else { body };
        Some((self.alloc(NodeValue::HtmlBlock(value), lines[li].start, lines[j - 1].end_nl), j))
    }

    // ---- Definition list (`definitions` extension) ----

    fn try_definition_list(&mut self, lines: &[Line], li: usize) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
        if li + 1 >= lines.len() || scanners::is_blank(&lines[li].text) {
            return Ok(None);
        }
        if !is_definition_marker(&lines[li + 1].text) {
            return Ok(None);
        }
        let start = lines[li].start;
        let list_node = self.alloc(NodeValue::DefinitionList, start, start);
        let mut j = li;
        loop {
            if j >= lines.len() || scanners::is_blank(&lines[j].text) {
                break;
            }
            if j + 1 >= lines.len() || !is_definition_marker(&lines[j + 1].text) {
                break;
            }
            let term_line = &lines[j];
            let term_node = self.alloc(NodeValue::DefinitionTerm, term_line.start, term_line.end);
            for c in self.inline(term_line.start, term_line.end)? {
                term_node.append(c);
            }
            list_node.append(term_node);
            j += 1;
            while j < lines.len() && is_definition_marker(&lines[j].text) {
                let line = &lines[j];
                let colon_at = line.text.chars().position(|c| c == ':').unwrap_or(0);
                let after: String = line.text.chars().skip(colon_at + 1).collect();
                let trimmed = after.trim_start();
                let skip = after.chars().count() - trimmed.chars().count();
                let content_start = (line.start + colon_at + 1 + skip).min(line.end);
                let def_node = self.alloc(NodeValue::Definition, line.start, line.end);
                for c in self.inline(content_start, line.end)? {
                    def_node.append(c);
                }
                list_node.append(def_node);
                j += 1;
            }
        }
        let end = if j > li { lines[j - 1].end_nl } else { lines[li].end_nl };
        list_node.data.borrow_mut().end_index = end;
        Ok(Some((list_node, j.max(li + 1))))
    }

    // ---- `[TOC]` marker (`toc` extension) ----

    fn try_toc(&mut self, lines: &[Line], li: usize) -> Option<(&'a AstNode<'a>, usize)> {
        if lines[li].text.trim() != "[TOC]" {
            return None;
        }
        Some((self.alloc(NodeValue::Toc(NodeToc { level: 6 }), lines[li].start, lines[li].end_nl), li + 1))
    }

    // ---- Paragraph (§4.1.1 "Paragraph look-ahead") ----

    fn parse_para(&mut self, lines: &[Line], li: usize) -> Result<(&'a AstNode<'a>, usize), Error> {
        let mut j = li;
        while j < lines.len() && !scanners::is_blank(&lines[j].text) {
            // A block quote marker always interrupts a paragraph, even
            // without an intervening blank line — required so a sub-parsed
            // block quote's stripped lines still split into Para/BlockQuote
            // siblings rather than being swallowed as paragraph text.
            if j > li && scanners::block_quote_marker(&lines[j].text).is_some() {
                break;
            }
            j += 1;
        }
        let start = lines[li].start;
        let end = lines[j - 1].end;
        let node = self.alloc(NodeValue::Para, start, end);
        for c in self.inline(start, end)? {
            node.append(c);
        }
        Ok((node, j))
    }
}

fn is_definition_marker(text: &str) -> bool {
    scanners::leading_indent(text) <= 3 && text.trim_start().starts_with(':')
}

/// Splits a reference/link target into `(url, title)`: `<url>` or bare
/// non-space URL, then an optional `"title"`/`'title'`/`(title)`.
fn split_url_title(s: &str) -> (String, String) {
    let s = s.trim();
    let mut chars = s.chars().peekable();
    let mut url = String::new();
    if chars.peek() == Some(&'<') {
        chars.next();
        for c in chars.by_ref() {
            if c == '>' {
                break;
            }
            url.push(c);
        }
    } else {
        for c in chars.by_ref() {
            if c.is_whitespace() {
                break;
            }
            url.push(c);
        }
    }
    let rest: String = chars.collect();
    let rest = rest.trim();
    if rest.is_empty() {
        return (url, String::new());
    }
    let first = rest.chars().next().unwrap();
    let close = match first {
        '"' => '"',
        '\'' => '\'',
        '(' => ')',
        _ => return (url, String::new()),
    };
    let body = &rest[first.len_utf8()..];
    let title = body.rfind(close).map(|end| body[..end].to_string()).unwrap_or_default();
    (url, title)
}
