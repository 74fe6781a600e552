//! The inline grammar (§4.1.2, §4.1.3): emphasis/strong with close-char
//! stealing, links/images in their explicit/reference/wiki/autolink/mail
//! forms, code spans, inline HTML, entities, backslash escapes, smart
//! typography, strikethrough, footnote references, and line breaks.
//!
//! Reference/footnote/abbreviation *resolution* happens later, against the
//! `Root`'s tables, at HTML-serialization time (§4.3) — this module only
//! ever records the label a `RefLink`/`FootnoteRef` points at.

use std::cell::RefCell;

use smallvec::SmallVec;
use typed_arena::Arena;

use crate::arena_tree::Node;
use crate::error::Error;
use crate::nodes::{
    make_node, AstNode, NodeEmphasis, NodeLink, NodeRefLink, NodeValue, NodeWikiLink, QuoteType,
    DUMMY_REFERENCE_KEY,
};
use crate::parser::{Deadline, Extensions, Plugins};

/// The literal placeholder recognized by the `intellij-dummy-identifier`
/// extension (§6.2).
const INTELLIJ_DUMMY_IDENTIFIER: &str = "IntellijIdeaRulezzz";

pub(crate) fn parse_inline_slice<'a>(
    arena: &'a Arena<AstNode<'a>>,
    extensions: &Extensions,
    plugins: &Plugins,
    deadline: &Deadline,
    source: &[char],
    start: usize,
    end: usize,
) -> Result<Vec<&'a AstNode<'a>>, Error> {
    let mut p = InlineParser {
        arena,
        extensions,
        plugins,
        deadline,
        source,
        pos: start,
        end,
    };
    let nodes = p.parse_inlines()?;
    Ok(coalesce_text(nodes))
}

struct InlineParser<'a, 'x> {
    arena: &'a Arena<AstNode<'a>>,
    extensions: &'x Extensions,
    plugins: &'x Plugins,
    deadline: &'x Deadline,
    source: &'x [char],
    pos: usize,
    end: usize,
}

impl<'a, 'x> InlineParser<'a, 'x> {
    fn alloc(&self, value: NodeValue, start: usize, end: usize) -> &'a AstNode<'a> {
        self.arena.alloc(Node::new(RefCell::new(make_node(value, start, end))))
    }

    fn peek(&self) -> Option<char> {
        if self.pos < self.end {
            Some(self.source[self.pos])
        } else {
            None
        }
    }

    fn prev_char(&self) -> Option<char> {
        if self.pos == 0 {
            None
        } else {
            Some(self.source[self.pos - 1])
        }
    }

    fn count_run(&self, ch: char) -> usize {
        let mut n = 0;
        while self.pos + n < self.end && self.source[self.pos + n] == ch {
            n += 1;
        }
        n
    }

    fn parse_inlines(&mut self) -> Result<Vec<&'a AstNode<'a>>, Error> {
        let mut out = Vec::new();
        while self.pos < self.end {
            out.push(self.parse_one()?);
        }
        Ok(out)
    }

    /// Parses until `self.source[self.pos..]` starts with `ch` repeated
    /// `take` times and [`InlineParser::may_close`] holds, or end-of-span.
    /// Used for emphasis/strong/strike bodies.
    fn parse_until_close(&mut self, ch: char, take: usize) -> Result<(Vec<&'a AstNode<'a>>, bool), Error> {
        // Most emphasis/strong/strike spans hold only a handful of nodes
        // before their closer; inline capacity avoids a heap allocation for
        // the common case, mirroring the teacher's bracket stack.
        let mut children: SmallVec<[&'a AstNode<'a>; 8]> = SmallVec::new();
        loop {
            if self.pos >= self.end {
                return Ok((children.into_vec(), false));
            }
            if self.source[self.pos] == ch {
                let run = self.count_run(ch);
                if run >= take && self.may_close(ch, run) {
                    self.pos += take;
                    return Ok((children.into_vec(), true));
                }
            }
            children.push(self.parse_one()?);
        }
    }

    fn parse_one(&mut self) -> Result<&'a AstNode<'a>, Error> {
        self.deadline.check()?;

        for plugin in &self.plugins.inline_plugins {
            let c = self.source[self.pos];
            if plugin.trigger_chars().contains(&c) {
                let remaining: String = self.source[self.pos..self.end].iter().collect();
                if let Some((consumed_bytes, value)) = plugin.try_parse(&remaining) {
                    let consumed_chars = remaining[..consumed_bytes.min(remaining.len())].chars().count().max(1);
                    let start = self.pos;
                    self.pos += consumed_chars;
                    return Ok(self.alloc(value, start, self.pos));
                }
            }
        }

        let c = self.source[self.pos];
        match c {
            '\\' => Ok(self.parse_escaped()),
            '`' => Ok(self.parse_code_span()),
            '*' | '_' => {
                if let Some(node) = self.try_emph_or_strong(c)? {
                    Ok(node)
                } else {
                    Ok(self.parse_plain_run())
                }
            }
            '~' if self.extensions.strikethrough => Ok(self.try_strike()?.unwrap_or_else(|| self.parse_plain_run())),
            '[' if self.extensions.footnotes && self.peek_footnote_ref() => Ok(self.parse_footnote_ref()),
            '[' if self.extensions.wikilinks && self.peek_wikilink() => self.parse_wikilink(),
            '[' => Ok(self.parse_bracket(false)?.unwrap_or_else(|| self.parse_plain_run())),
            '!' if self.peek_image() => Ok(self.parse_bracket(true)?.unwrap_or_else(|| self.parse_plain_run())),
            '<' => Ok(self.parse_angle()?.unwrap_or_else(|| self.parse_plain_run())),
            '&' => Ok(self.parse_entity()),
            '\n' => Ok(self.parse_endline()),
            '"' | '\'' | '«' | '»' if self.extensions.quotes => Ok(self.parse_quote(c)),
            _ if self.extensions.autolinks && self.peek_bare_autolink() => Ok(self.parse_bare_autolink()),
            _ if self.extensions.smarts && matches!(c, '-' | '.') => {
                Ok(self.try_smart_punct(c).unwrap_or_else(|| self.parse_plain_run()))
            }
            'I' if self.extensions.intellij_dummy_identifier && self.matches_literal(INTELLIJ_DUMMY_IDENTIFIER) => {
                Ok(self.parse_intellij_dummy_identifier())
            }
            _ => Ok(self.parse_plain_run()),
        }
    }

    // ---- Escapes (§4.1.2) ----

    fn parse_escaped(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        let next = self.source.get(self.pos + 1).copied();
        if next.map(|c| c.is_ascii() && crate::ctype::ispunct(c as u8)).unwrap_or(false) {
            let escaped = self.source[self.pos + 1];
            self.pos += 2;
            self.alloc(NodeValue::SpecialText(escaped.to_string()), start, self.pos)
        } else {
            self.pos += 1;
            self.alloc(NodeValue::Text("\\".to_string()), start, self.pos)
        }
    }

    // ---- Code spans ----

    fn parse_code_span(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        let open_len = self.count_run('`');
        let open_end = self.pos + open_len;
        let mut j = open_end;
        loop {
            if j >= self.end {
                self.pos = open_end;
                return self.alloc(NodeValue::Text("`".repeat(open_len)), start, open_end);
            }
            if self.source[j] == '`' {
                let run_start = j;
                let mut run_len = 0;
                while j < self.end && self.source[j] == '`' {
                    j += 1;
                    run_len += 1;
                }
                if run_len == open_len {
                    let mut content: String = self.source[open_end..run_start].iter().collect();
                    if content.starts_with(' ') && content.ends_with(' ') && content.trim() != "" {
                        content = content[1..content.len() - 1].to_string();
                    }
                    self.pos = j;
                    return self.alloc(NodeValue::Code(content), start, j);
                }
                continue;
            }
            j += 1;
        }
    }

    // ---- Emphasis / strong (§4.1.2) ----

    fn may_enter(&self, ch: char) -> bool {
        match self.prev_char() {
            None => true,
            Some(p) => {
                if p.is_whitespace() {
                    return true;
                }
                if self.extensions.relaxed_strong_emphasis_rules {
                    if ch == '*' {
                        return !p.is_alphanumeric();
                    }
                    if ch == '_' {
                        return !p.is_alphanumeric() && p != '_';
                    }
                }
                false
            }
        }
    }

    fn may_close(&self, ch: char, run_len: usize) -> bool {
        if self.prev_char().map(|p| p.is_whitespace()).unwrap_or(true) {
            return false;
        }
        if ch == '_' {
            let after = self.source.get(self.pos + run_len).copied();
            if after.map(|a| a.is_alphanumeric()).unwrap_or(false) {
                return false;
            }
        }
        true
    }

    fn try_emph_or_strong(&mut self, ch: char) -> Result<Option<&'a AstNode<'a>>, Error> {
        if !self.may_enter(ch) {
            return Ok(None);
        }
        let run_len = self.count_run(ch);
        if run_len == 0 {
            return Ok(None);
        }
        if run_len > 3 {
            // Excess chars beyond 3 are emitted as plain text before the
            // triple-delimiter form (see DESIGN.md: close-char stealing is
            // only modeled exactly for the documented 1/2/3-run cases).
            let extra = run_len - 3;
            let start = self.pos;
            self.pos += extra;
            let text = self.alloc(NodeValue::Text(ch.to_string().repeat(extra)), start, self.pos);
            // A single extra node breaks the caller's "one node per call"
            // contract; fold it in by returning it directly and letting the
            // run continue on the next call from the same position.
            return Ok(Some(text));
        }
        if run_len == 3 {
            return self.parse_strong_wrapping_emphasis(ch).map(Some);
        }
        let take = run_len.min(2);
        self.parse_single_emphasis(ch, take).map(Some)
    }

    fn parse_single_emphasis(&mut self, ch: char, take: usize) -> Result<&'a AstNode<'a>, Error> {
        let start = self.pos;
        self.pos += take;
        let opening_chars: String = ch.to_string().repeat(take);
        let (children, closed) = self.parse_until_close(ch, take)?;
        let value = if take == 2 {
            NodeValue::Strong(NodeEmphasis { opening_chars, closed })
        } else {
            NodeValue::Emphasis(NodeEmphasis { opening_chars, closed })
        };
        let node = self.alloc(value, start, self.pos);
        for c in coalesce_text(children) {
            node.append(c);
        }
        Ok(node)
    }

    /// `***text***` (§4.1.2 "close-char stealing"): modeled directly as
    /// `Strong(Emphasis(text))`, since the run-length-3 case is the one the
    /// grammar documents explicitly.
    fn parse_strong_wrapping_emphasis(&mut self, ch: char) -> Result<&'a AstNode<'a>, Error> {
        let outer_start = self.pos;
        self.pos += 2;
        let strong_opening = ch.to_string().repeat(2);
        let em_start = self.pos;
        self.pos += 1;
        let em_opening = ch.to_string();

        let (em_children, em_closed) = self.parse_until_close(ch, 1)?;
        let em_node = self.alloc(
            NodeValue::Emphasis(NodeEmphasis { opening_chars: em_opening, closed: em_closed }),
            em_start,
            self.pos,
        );
        for c in coalesce_text(em_children) {
            em_node.append(c);
        }

        let mut strong_children = vec![em_node];
        let mut strong_closed = false;
        if em_closed {
            let (rest, closed) = self.parse_until_close(ch, 2)?;
            strong_children.extend(coalesce_text(rest));
            strong_closed = closed;
        }
        let strong_node = self.alloc(
            NodeValue::Strong(NodeEmphasis { opening_chars: strong_opening, closed: strong_closed }),
            outer_start,
            self.pos,
        );
        for c in strong_children {
            strong_node.append(c);
        }
        Ok(strong_node)
    }

    // ---- Strikethrough (`strikethrough` extension) ----

    fn try_strike(&mut self) -> Result<Option<&'a AstNode<'a>>, Error> {
        if self.count_run('~') < 2 {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 2;
        let (children, closed) = self.parse_until_close('~', 2)?;
        if !closed {
            // No matching close: treat the opener as literal text.
            self.pos = start;
            return Ok(None);
        }
        let node = self.alloc(NodeValue::Strike, start, self.pos);
        for c in coalesce_text(children) {
            node.append(c);
        }
        Ok(Some(node))
    }

    // ---- Smart typography (`smarts`/`quotes` extensions) ----

    /// A quote-like character only opens a paired [`NodeValue::Quoted`] span
    /// if a plausible close exists later in the current inline span;
    /// otherwise (e.g. the apostrophe in "don't") it would otherwise swallow
    /// the rest of the span hunting for a closer that never comes, so it is
    /// emitted as a standalone mark instead (§3.1 `Apostrophe`).
    fn parse_quote(&mut self, c: char) -> &'a AstNode<'a> {
        let start = self.pos;
        let (kind, close) = match c {
            '«' => (QuoteType::DoubleAngle, '»'),
            '"' => (QuoteType::Double, '"'),
            _ => (QuoteType::Single, '\''),
        };
        let has_close = (self.pos + 1..self.end).any(|i| self.source[i] == close);
        self.pos += 1;
        if !has_close {
            return match c {
                '\'' => self.alloc(NodeValue::Apostrophe, start, self.pos),
                _ => self.alloc(NodeValue::Text(c.to_string()), start, self.pos),
            };
        }
        self.parse_quoted_until(kind, close, start)
    }

    fn parse_quoted_until(&mut self, kind: QuoteType, close: char, start: usize) -> &'a AstNode<'a> {
        let mut children = Vec::new();
        let mut closed = false;
        while self.pos < self.end {
            if self.source[self.pos] == close {
                self.pos += 1;
                closed = true;
                break;
            }
            match self.parse_one() {
                Ok(n) => children.push(n),
                Err(_) => break,
            }
        }
        let node = self.alloc(NodeValue::Quoted(kind), start, self.pos);
        if closed {
            for c in coalesce_text(children) {
                node.append(c);
            }
        } else {
            // No closing quote found: fall back to literal text for the
            // whole span already consumed.
            let text: String = self.source[start..self.pos].iter().collect();
            return self.alloc(NodeValue::Text(text), start, self.pos);
        }
        node
    }

    fn try_smart_punct(&mut self, c: char) -> Option<&'a AstNode<'a>> {
        let start = self.pos;
        match c {
            '-' => {
                let run = self.count_run('-');
                if run >= 3 {
                    self.pos += 3;
                    Some(self.alloc(NodeValue::Emdash, start, self.pos))
                } else if run == 2 {
                    self.pos += 2;
                    Some(self.alloc(NodeValue::Endash, start, self.pos))
                } else {
                    None
                }
            }
            '.' => {
                if self.pos + 2 < self.end && self.source[self.pos + 1] == '.' && self.source[self.pos + 2] == '.' {
                    self.pos += 3;
                    Some(self.alloc(NodeValue::Ellipsis, start, self.pos))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    // ---- Links / images / wikilinks (§4.1.3) ----

    fn peek_image(&self) -> bool {
        self.pos + 1 < self.end && self.source[self.pos + 1] == '['
    }

    fn peek_wikilink(&self) -> bool {
        self.pos + 1 < self.end && self.source[self.pos + 1] == '['
    }

    fn find_matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0;
        let mut i = open;
        while i < self.end {
            match self.source[i] {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                '\\' => i += 1,
                _ => {}
            }
            i += 1;
        }
        None
    }

    fn parse_wikilink(&mut self) -> Result<&'a AstNode<'a>, Error> {
        let start = self.pos;
        self.pos += 2;
        let content_start = self.pos;
        let mut j = self.pos;
        while j + 1 < self.end && !(self.source[j] == ']' && self.source[j + 1] == ']') {
            j += 1;
        }
        let content: String = self.source[content_start..j.min(self.end)].iter().collect();
        self.pos = (j + 2).min(self.end);
        let (page, text) = match content.split_once('|') {
            Some((page, text)) => (page.trim().to_string(), Some(text.trim().to_string())),
            None => (content.trim().to_string(), None),
        };
        Ok(self.alloc(NodeValue::WikiLink(NodeWikiLink { page, text }), start, self.pos))
    }

    /// Parses `[...]` or `![...]` in every form: explicit `(url "title")`,
    /// reference `[key]`/`[]`, or bare `[text]`. Returns `None` (leaving
    /// `self.pos` untouched) if `[` never finds a matching `]`.
    fn parse_bracket(&mut self, image: bool) -> Result<Option<&'a AstNode<'a>>, Error> {
        let start = self.pos;
        let bracket_open = if image { self.pos + 1 } else { self.pos };
        let Some(close) = self.find_matching_bracket(bracket_open) else {
            return Ok(None);
        };
        let text_start = bracket_open + 1;
        let label_children = self.sub_inline(text_start, close)?;

        self.pos = close + 1;

        // Explicit form: `(url "title")`, possibly spanning multiple lines
        // when `multi-line-image-urls` is enabled for images (§4.1.3).
        if self.peek() == Some('(') {
            if let Some((url, title, after)) = self.parse_explicit_target(self.pos, image) {
                self.pos = after;
                let value = if image {
                    NodeValue::ExpImage(NodeLink { url, title })
                } else {
                    NodeValue::ExpLink(NodeLink { url, title })
                };
                let node = self.alloc(value, start, self.pos);
                for c in label_children {
                    node.append(c);
                }
                return Ok(Some(node));
            }
        }

        // Reference form: `[key]` or `[]` immediately following.
        if self.peek() == Some('[') {
            if let Some(ref_close) = self.find_matching_bracket(self.pos) {
                let key_text: String = self.source[self.pos + 1..ref_close].iter().collect();
                self.pos = ref_close + 1;
                let reference_key = if key_text.trim().is_empty() {
                    if self.extensions.dummy_reference_key {
                        Some(DUMMY_REFERENCE_KEY.to_string())
                    } else {
                        None
                    }
                } else {
                    Some(key_text)
                };
                let value = if image {
                    NodeValue::RefImage(NodeRefLink { reference_key })
                } else {
                    NodeValue::RefLink(NodeRefLink { reference_key })
                };
                let node = self.alloc(value, start, self.pos);
                for c in label_children {
                    node.append(c);
                }
                return Ok(Some(node));
            }
        }

        // Bare `[text]` / `![text]`: implicit shortcut reference, resolved
        // against the label's own (normalized) text at render time.
        let value = if image {
            NodeValue::RefImage(NodeRefLink { reference_key: None })
        } else {
            NodeValue::RefLink(NodeRefLink { reference_key: None })
        };
        let node = self.alloc(value, start, self.pos);
        for c in label_children {
            node.append(c);
        }
        Ok(Some(node))
    }

    /// Parses `(url "title")` (or `(url)`) at `at` (the index of the `(`),
    /// returning `(url, title, index_after_close_paren)`. When
    /// `multi-line-image-urls` is enabled and `image` is true, the url may
    /// itself span multiple `source` newlines (the sentinel masking scheme
    /// does not apply here; this just allows `\n` within the parenthesized
    /// span like any other whitespace).
    fn parse_explicit_target(&self, at: usize, image: bool) -> Option<(String, String, usize)> {
        let multiline = image && self.extensions.multi_line_image_urls;
        if self.source.get(at) != Some(&'(') {
            return None;
        }
        let mut i = at + 1;
        while i < self.end && self.source[i].is_whitespace() {
            i += 1;
        }
        let mut url = String::new();
        if self.source.get(i) == Some(&'<') {
            i += 1;
            while i < self.end && self.source[i] != '>' {
                url.push(self.source[i]);
                i += 1;
            }
            i += 1;
        } else if multiline {
            // §4.1.3 "Multi-line image URL": the intervening text, blank
            // lines included, is absorbed verbatim up to the closing `)`
            // (or `"title")`) rather than stopping at the first whitespace.
            while i < self.end && self.source[i] != ')' && self.source[i] != '"' && self.source[i] != '\'' {
                url.push(self.source[i]);
                i += 1;
            }
            while url.ends_with(char::is_whitespace) {
                url.pop();
            }
        } else {
            while i < self.end && !self.source[i].is_whitespace() && self.source[i] != ')' {
                url.push(self.source[i]);
                i += 1;
            }
        }
        while i < self.end && self.source[i].is_whitespace() {
            i += 1;
        }
        let mut title = String::new();
        if matches!(self.source.get(i), Some('"') | Some('\'')) {
            let close = self.source[i];
            i += 1;
            while i < self.end && self.source[i] != close {
                title.push(self.source[i]);
                i += 1;
            }
            i += 1;
            while i < self.end && self.source[i].is_whitespace() {
                i += 1;
            }
        }
        if self.source.get(i) != Some(&')') {
            return None;
        }
        Some((url, title, i + 1))
    }

    /// Parses the inline grammar over a bracketed label span that lies
    /// within this same buffer, producing absolutely-positioned nodes
    /// exactly like [`parse_inlines`] — labels never cross the
    /// masking/compaction boundary, so no remap is needed.
    fn sub_inline(&self, from: usize, to: usize) -> Result<Vec<&'a AstNode<'a>>, Error> {
        parse_inline_slice(self.arena, self.extensions, self.plugins, self.deadline, self.source, from, to)
    }

    // ---- Autolinks / mail links / inline HTML (§4.1.3) ----

    fn parse_angle(&mut self) -> Result<Option<&'a AstNode<'a>>, Error> {
        let start = self.pos;
        let Some(close) = (self.pos + 1..self.end).find(|&i| self.source[i] == '>') else {
            return Ok(None);
        };
        let content: String = self.source[self.pos + 1..close].iter().collect();
        if content.is_empty() || content.contains(|c: char| c.is_whitespace() && !content.starts_with('!')) {
            if !looks_like_html_tag(&content) {
                return Ok(None);
            }
        }
        self.pos = close + 1;
        if looks_like_uri(&content) {
            let url = crate::entity::unescape_html(&content);
            return Ok(Some(self.alloc(NodeValue::AutoLink(NodeLink { url, title: String::new() }), start, self.pos)));
        }
        if looks_like_email(&content) {
            let url = format!("mailto:{}", crate::entity::unescape_html(&content));
            return Ok(Some(self.alloc(NodeValue::MailLink(NodeLink { url, title: String::new() }), start, self.pos)));
        }
        let raw: String = self.source[start..self.pos].iter().collect();
        let value = if self.extensions.inline_html_suppress { String::new() } else { raw };
        Ok(Some(self.alloc(NodeValue::InlineHtml(value), start, self.pos)))
    }

    fn peek_bare_autolink(&self) -> bool {
        for scheme in ["http://", "https://", "ftp://"] {
            if self.matches_literal(scheme) {
                return true;
            }
        }
        false
    }

    fn matches_literal(&self, lit: &str) -> bool {
        let chars: Vec<char> = lit.chars().collect();
        if self.pos + chars.len() > self.end {
            return false;
        }
        self.source[self.pos..self.pos + chars.len()] == chars[..]
    }

    fn parse_bare_autolink(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        let mut j = self.pos;
        while j < self.end && !self.source[j].is_whitespace() {
            j += 1;
        }
        while j > start && crate::ctype::is_unicode_punctuation(self.source[j - 1]) {
            j -= 1;
        }
        let url: String = self.source[start..j].iter().collect();
        self.pos = j;
        self.alloc(NodeValue::AutoLink(NodeLink { url, title: String::new() }), start, self.pos)
    }

    // ---- IntelliJ dummy identifier (`intellij-dummy-identifier` extension) ----

    /// Consumes the literal caret placeholder IntelliJ's own pegdown-derived
    /// parser's test harness inserts at the cursor during live-template
    /// completion testing, emitting an empty `Text` node so it occupies its
    /// source span (Invariant 1) but contributes nothing to the rendered
    /// output (§9 Open Questions: resolved in DESIGN.md).
    fn parse_intellij_dummy_identifier(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        self.pos += INTELLIJ_DUMMY_IDENTIFIER.chars().count();
        self.alloc(NodeValue::Text(String::new()), start, self.pos)
    }

    // ---- Footnote references (`footnotes` extension) ----

    /// `[^label]`, matching the definition syntax `try_footnote_def` parses
    /// at the block level.
    fn peek_footnote_ref(&self) -> bool {
        self.pos + 1 < self.end && self.source[self.pos + 1] == '^'
    }

    fn parse_footnote_ref(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        if let Some(close) = self.find_matching_bracket(self.pos) {
            let label: String = self.source[self.pos + 2..close].iter().collect();
            self.pos = close + 1;
            return self.alloc(NodeValue::FootnoteRef(label), start, self.pos);
        }
        self.pos += 1;
        self.alloc(NodeValue::Text("[".to_string()), start, self.pos)
    }

    // ---- Entities ----

    fn parse_entity(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        let rest: String = self.source[self.pos + 1..self.end].iter().collect();
        match crate::entity::unescape(rest.as_bytes()) {
            Some((decoded, consumed_bytes)) => {
                let consumed_chars = rest[..consumed_bytes.min(rest.len())].chars().count();
                self.pos += 1 + consumed_chars;
                self.alloc(NodeValue::Text(decoded), start, self.pos)
            }
            None => {
                self.pos += 1;
                self.alloc(NodeValue::Text("&".to_string()), start, self.pos)
            }
        }
    }

    // ---- Line breaks (§4.1.2 "Endline") ----

    fn parse_endline(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        let mut trailing_spaces = 0;
        let mut k = start;
        while k > 0 && self.source[k - 1] == ' ' {
            trailing_spaces += 1;
            k -= 1;
        }
        self.pos += 1;
        if self.extensions.hardwraps || trailing_spaces >= 2 {
            self.alloc(NodeValue::LineBreak, start, self.pos)
        } else {
            self.alloc(NodeValue::Text(" ".to_string()), start, self.pos)
        }
    }

    // ---- Plain text (Invariant 2 coalescing happens in `coalesce_text`) ----

    fn parse_plain_run(&mut self) -> &'a AstNode<'a> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.end && !is_special(self.source[self.pos], self.extensions) {
            self.pos += 1;
        }
        let text: String = self.source[start..self.pos].iter().collect();
        self.alloc(NodeValue::Text(text), start, self.pos)
    }
}

fn is_special(c: char, extensions: &Extensions) -> bool {
    match c {
        '\\' | '`' | '*' | '_' | '[' | '!' | '<' | '&' | '\n' => true,
        '~' if extensions.strikethrough => true,
        '"' | '\'' | '«' | '»' if extensions.quotes => true,
        '^' if extensions.footnotes => true,
        '-' | '.' if extensions.smarts => true,
        _ => false,
    }
}

fn looks_like_uri(s: &str) -> bool {
    if let Some(colon) = s.find(':') {
        let scheme = &s[..colon];
        !scheme.is_empty()
            && scheme.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    } else {
        false
    }
}

fn looks_like_email(s: &str) -> bool {
    !s.contains(' ') && s.matches('@').count() == 1 && !s.starts_with('@') && !s.ends_with('@')
}

fn looks_like_html_tag(s: &str) -> bool {
    let t = s.trim_start_matches('/');
    t.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false) || s.starts_with('!') || s.starts_with('?')
}

/// Merges adjacent `Text` nodes (Invariant 2); `SpecialText` is never
/// merged into a neighbor, in either direction.
fn coalesce_text<'a>(nodes: Vec<&'a AstNode<'a>>) -> Vec<&'a AstNode<'a>> {
    let mut out: Vec<&'a AstNode<'a>> = Vec::with_capacity(nodes.len());
    for n in nodes {
        let n_is_text = matches!(n.data.borrow().value, NodeValue::Text(_));
        if n_is_text {
            if let Some(&last) = out.last() {
                let last_is_text = matches!(last.data.borrow().value, NodeValue::Text(_));
                if last_is_text {
                    let extra = match &n.data.borrow().value {
                        NodeValue::Text(t) => t.clone(),
                        _ => unreachable!(),
                    };
                    let end = n.data.borrow().end_index;
                    let mut last_ast = last.data.borrow_mut();
                    if let NodeValue::Text(t) = &mut last_ast.value {
                        t.push_str(&extra);
                    }
                    last_ast.end_index = end;
                    continue;
                }
            }
        }
        out.push(n);
    }
    out
}
