//! The HTML serializer (§4.3): a depth-first visitor over the AST that
//! resolves references/abbreviations/footnotes against the Root's tables,
//! computes heading anchor ids up front, and delegates code blocks and
//! link-like nodes to the configured plugins.

pub mod anchorizer;
pub mod attributes;
mod context;

use std::fmt::{self, Write};

use crate::character_set::character_set;
use crate::error::Error;
use crate::link_renderer::{DefaultLinkRenderer, LinkRenderer, Rendering};
use crate::nodes::{AstNode, NodeHeading, NodeList, NodeTable, NodeTableCell, NodeValue, QuoteType, TableAlignment};
use crate::parser::options::{Extensions, Plugins};
use crate::verbatim;

use self::attributes::Attributes;
pub use self::context::Context;

/// Renders `root` (as produced by [`crate::parser::parse_document`]) to an
/// HTML string (§4.3, §6.1 `markdown_to_html`). Writing to the in-memory
/// `String` sink cannot actually fail; a stray [`fmt::Error`] is mapped to
/// [`Error::ParseFailure`] only to satisfy the public `Result<_, Error>`
/// contract.
pub fn format_document<'a>(root: &'a AstNode<'a>, extensions: &Extensions, plugins: &Plugins) -> Result<String, Error> {
    let mut output = String::new();
    let (references, abbreviations) = {
        let root_ast = root.data.borrow();
        (root_ast.tables.references.clone(), root_ast.tables.abbreviations.clone())
    };

    let mut ctx = Context::new(&mut output, extensions, plugins);
    ctx.references = references;
    ctx.abbreviations = abbreviations;

    precompute_heading_anchors(&mut ctx, root);

    let mut footnote_defs: Vec<&'a AstNode<'a>> = Vec::new();
    for child in root.children() {
        let is_footnote_def = matches!(child.data.borrow().value, NodeValue::FootnoteDef(..));
        if is_footnote_def {
            footnote_defs.push(child);
            continue;
        }
        let is_aside = matches!(child.data.borrow().value, NodeValue::Reference(..) | NodeValue::Abbreviation(..));
        if is_aside {
            continue;
        }
        render_node(&mut ctx, child).map_err(|_| Error::ParseFailure)?;
    }

    if !ctx.referenced_footnotes.is_empty() {
        render_footnotes(&mut ctx, &footnote_defs).map_err(|_| Error::ParseFailure)?;
    }

    if let Some(kind) = ctx.unknown_node.get() {
        return Err(Error::UnknownNode { kind });
    }

    drop(ctx);
    Ok(output)
}

/// Walks the tree in document order, assigning every `Heading` an anchor id
/// up front (§4.3 "Heading anchor ids", §8 "the anchor id produced by the
/// id-computing visitor equals the anchor id used in both the heading emit
/// and any `[TOC]` emit"). Must run once, before any node renders, so the
/// `Anchorizer`'s uniqueness counter is not perturbed by `[TOC]` consulting
/// it out of document order.
fn precompute_heading_anchors<'a>(ctx: &mut Context, root: &'a AstNode<'a>) {
    for node in root.descendants() {
        let (level, start_index, text) = {
            let ast = node.data.borrow();
            match &ast.value {
                NodeValue::Heading(h) => (h.level, ast.start_index, collect_text(node)),
                _ => continue,
            }
        };
        if let Some(id) = compute_heading_anchor_id(ctx, level, &text) {
            ctx.header_anchor_ids.insert(start_index, id);
        }
    }
}

fn compute_heading_anchor_id(ctx: &mut Context, level: u8, text: &str) -> Option<String> {
    if let Some(hook) = ctx.plugins.header_id_computer.clone() {
        let id = hook.compute_id(level, text);
        return if id.is_empty() { None } else { Some(id) };
    }
    if ctx.extension.ext_anchor_links {
        return Some(ctx.anchorizer.anchorize(text));
    }
    if ctx.extension.anchor_links {
        let id = anchorizer::simple_anchor(text);
        return if id.is_empty() { None } else { Some(id) };
    }
    None
}

/// Concatenates the literal text of every `Text`/`SpecialText`/`Code`
/// descendant of `node`, used for anchor ids, image alt text, and the
/// bare-reference-shortcut lookup key.
fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    collect_text_into(node, &mut out);
    out
}

fn collect_text_into<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) | NodeValue::SpecialText(t) | NodeValue::Code(t) => {
            out.push_str(t);
            return;
        }
        NodeValue::LineBreak => {
            out.push(' ');
            return;
        }
        NodeValue::Ellipsis => {
            out.push_str("...");
            return;
        }
        NodeValue::Emdash => {
            out.push_str("--");
            return;
        }
        NodeValue::Endash => {
            out.push('-');
            return;
        }
        NodeValue::Apostrophe => {
            out.push('\'');
            return;
        }
        NodeValue::Nbsp => {
            out.push(' ');
            return;
        }
        _ => {}
    }
    for child in node.children() {
        collect_text_into(child, out);
    }
}

fn render_children<'a>(ctx: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    for child in node.children() {
        render_node(ctx, child)?;
    }
    Ok(())
}

fn render_node<'a>(ctx: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::Root => render_children(ctx, node)?,
        NodeValue::Para => render_para(ctx, node)?,
        NodeValue::BlockQuote => render_block_quote(ctx, node)?,
        NodeValue::Verbatim(v) => render_verbatim(ctx, &v)?,
        NodeValue::HtmlBlock(raw) => ctx.write_str(&raw)?,
        NodeValue::InlineHtml(raw) => ctx.write_str(&raw)?,
        NodeValue::Heading(h) => render_heading(ctx, node, &h)?,
        NodeValue::BulletList(l) => render_list(ctx, node, "ul", &l)?,
        NodeValue::OrderedList(l) => render_list(ctx, node, "ol", &l)?,
        NodeValue::ListItem => render_list_item(ctx, node, None)?,
        NodeValue::TaskListItem(t) => render_list_item(ctx, node, Some(&t))?,
        NodeValue::DefinitionList => render_wrapped(ctx, node, "dl")?,
        NodeValue::DefinitionTerm => render_wrapped(ctx, node, "dt")?,
        NodeValue::Definition => render_wrapped(ctx, node, "dd")?,
        NodeValue::Table(t) => render_table(ctx, node, &t)?,
        NodeValue::TableHeader => render_wrapped(ctx, node, "thead")?,
        NodeValue::TableBody => render_wrapped(ctx, node, "tbody")?,
        NodeValue::TableRow => render_wrapped(ctx, node, "tr")?,
        NodeValue::TableCell(c) => render_table_cell(ctx, node, &c)?,
        NodeValue::TableColumn(..) => {}
        NodeValue::TableCaption => render_wrapped(ctx, node, "caption")?,
        NodeValue::HorizontalRule => {
            ctx.cr()?;
            ctx.write_str("<hr/>")?;
            ctx.cr()?;
        }
        NodeValue::LineBreak => ctx.write_str("<br/>\n")?,
        NodeValue::Ellipsis => ctx.write_str("\u{2026}")?,
        NodeValue::Emdash => ctx.write_str("\u{2014}")?,
        NodeValue::Endash => ctx.write_str("\u{2013}")?,
        NodeValue::Apostrophe => ctx.write_str("\u{2019}")?,
        NodeValue::Nbsp => ctx.write_str("&nbsp;")?,
        NodeValue::Text(t) => render_text(ctx, &t)?,
        NodeValue::SpecialText(t) => ctx.escape(&t)?,
        NodeValue::Emphasis(e) => render_emphasis(ctx, node, "em", &e.opening_chars, e.closed)?,
        NodeValue::Strong(e) => render_emphasis(ctx, node, "strong", &e.opening_chars, e.closed)?,
        NodeValue::Strike => render_wrapped(ctx, node, "del")?,
        NodeValue::Quoted(kind) => render_quoted(ctx, node, kind)?,
        NodeValue::Code(code) => {
            ctx.write_str("<code>")?;
            ctx.escape(&code)?;
            ctx.write_str("</code>")?;
        }
        NodeValue::AutoLink(link) => render_leaf_link(ctx, LeafLinkKind::Auto, &link)?,
        NodeValue::MailLink(link) => render_leaf_link(ctx, LeafLinkKind::Mail, &link)?,
        NodeValue::AnchorLink(link) => render_leaf_link(ctx, LeafLinkKind::Anchor, &link)?,
        NodeValue::WikiLink(w) => render_wikilink(ctx, &w)?,
        NodeValue::ExpLink(link) => render_rich_link(ctx, node, RichLinkKind::Exp, &link)?,
        NodeValue::ExpImage(link) => render_rich_image(ctx, node, &link)?,
        NodeValue::RefLink(r) => render_reflink(ctx, node, &r, false)?,
        NodeValue::RefImage(r) => render_reflink(ctx, node, &r, true)?,
        NodeValue::FootnoteDef(..) => {} // rendered in a dedicated pass, §4.3 "Footnotes"
        NodeValue::FootnoteRef(label) => render_footnote_ref(ctx, &label)?,
        NodeValue::Abbreviation(..) => {} // side-table definition, not itself rendered
        NodeValue::Reference(..) => {}    // side-table definition, not itself rendered
        NodeValue::Toc(_) => render_toc(ctx, node)?,
        NodeValue::Plugin(p) => render_plugin_node(ctx, node, &p)?,
    }
    Ok(())
}

/// §6.3 "Serializer plugin": offers every registered plugin a chance to
/// render a node the built-in match above has no case for. The first
/// acceptor wins; if none accept, the node kind is recorded on the context
/// and surfaced as [`Error::UnknownNode`] once the whole tree has been
/// traversed (§7 "Unknown node at serialization").
fn render_plugin_node<'a>(ctx: &mut Context, node: &'a AstNode<'a>, p: &crate::nodes::NodePlugin) -> fmt::Result {
    for plugin in ctx.plugins.serializer_plugins.clone() {
        let mut buf = String::new();
        if plugin.try_render(node, &mut buf) {
            return ctx.write_str(&buf);
        }
    }
    ctx.unknown_node.set(Some("Plugin"));
    Ok(())
}

// ---- Blocks ----

/// Tight-list paragraphs render without a `<p>` wrapper, exactly as the
/// teacher's `render_paragraph` decides: check the grandparent list's
/// `tight` flag, not this node's own state.
fn render_para<'a>(ctx: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    if in_tight_list_item(node) {
        return render_children(ctx, node);
    }
    ctx.cr()?;
    ctx.write_str("<p>")?;
    render_children(ctx, node)?;
    ctx.write_str("</p>")?;
    ctx.cr()?;
    Ok(())
}

fn in_tight_list_item<'a>(node: &'a AstNode<'a>) -> bool {
    let Some(parent) = node.parent() else { return false };
    let is_item = matches!(parent.data.borrow().value, NodeValue::ListItem | NodeValue::TaskListItem(..));
    if !is_item {
        return false;
    }
    let Some(grandparent) = parent.parent() else { return false };
    match &grandparent.data.borrow().value {
        NodeValue::BulletList(l) | NodeValue::OrderedList(l) => l.tight,
        _ => false,
    }
}

fn render_block_quote<'a>(ctx: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    ctx.cr()?;
    ctx.write_str("<blockquote>")?;
    ctx.cr()?;
    render_children(ctx, node)?;
    ctx.cr()?;
    ctx.write_str("</blockquote>")?;
    ctx.cr()?;
    Ok(())
}

fn render_verbatim(ctx: &mut Context, v: &crate::nodes::NodeVerbatim) -> fmt::Result {
    ctx.cr()?;
    let serializer = verbatim::resolve(&ctx.plugins.verbatim_serializers, v.language.as_deref());
    ctx.write_str(&serializer.render(v.language.as_deref(), &v.literal))?;
    ctx.cr()?;
    Ok(())
}

fn render_heading<'a>(ctx: &mut Context, node: &'a AstNode<'a>, h: &NodeHeading) -> fmt::Result {
    ctx.cr()?;
    write!(ctx, "<h{}>", h.level)?;

    let start_index = node.data.borrow().start_index;
    let anchor_id = ctx.header_anchor_ids.get(&start_index).cloned();

    if let Some(id) = anchor_id {
        let text = collect_text(node);
        let renderer = link_renderer(ctx);
        let rendering = renderer.anchor_link(&crate::nodes::NodeLink { url: id, title: String::new() }, &text);
        ctx.write_str("<a")?;
        write!(ctx, "{}", rendering.attributes)?;
        if ctx.extension.ext_anchor_links_wrap {
            ctx.write_str(">")?;
            render_children(ctx, node)?;
            ctx.write_str("</a>")?;
        } else {
            ctx.write_str("></a>")?;
            render_children(ctx, node)?;
        }
    } else {
        render_children(ctx, node)?;
    }

    write!(ctx, "</h{}>", h.level)?;
    ctx.cr()?;
    Ok(())
}

fn render_list<'a>(ctx: &mut Context, node: &'a AstNode<'a>, tag: &str, list: &NodeList) -> fmt::Result {
    ctx.cr()?;
    if tag == "ol" && list.start != 1 {
        write!(ctx, "<ol start=\"{}\">", list.start)?;
    } else {
        write!(ctx, "<{}>", tag)?;
    }
    ctx.cr()?;
    render_children(ctx, node)?;
    ctx.cr()?;
    write!(ctx, "</{}>", tag)?;
    ctx.cr()?;
    Ok(())
}

fn render_list_item<'a>(
    ctx: &mut Context,
    node: &'a AstNode<'a>,
    task: Option<&crate::nodes::NodeTaskListItem>,
) -> fmt::Result {
    ctx.cr()?;
    if let Some(t) = task {
        let checked = if t.done { " checked=\"\"" } else { "" };
        write!(ctx, "<li><input type=\"checkbox\" disabled=\"\"{}/> ", checked)?;
    } else {
        ctx.write_str("<li>")?;
    }
    render_children(ctx, node)?;
    ctx.write_str("</li>")?;
    ctx.cr()?;
    Ok(())
}

fn render_wrapped<'a>(ctx: &mut Context, node: &'a AstNode<'a>, tag: &str) -> fmt::Result {
    ctx.cr()?;
    write!(ctx, "<{}>", tag)?;
    render_children(ctx, node)?;
    write!(ctx, "</{}>", tag)?;
    ctx.cr()?;
    Ok(())
}

// ---- Tables ----

fn render_table<'a>(ctx: &mut Context, node: &'a AstNode<'a>, _t: &NodeTable) -> fmt::Result {
    ctx.cr()?;
    ctx.write_str("<table>")?;
    ctx.cr()?;
    render_children(ctx, node)?;
    ctx.cr()?;
    ctx.write_str("</table>")?;
    ctx.cr()?;
    Ok(())
}

fn table_alignments<'a>(node: &'a AstNode<'a>) -> Vec<TableAlignment> {
    let Some(table) = node.ancestors().find(|n| matches!(n.data.borrow().value, NodeValue::Table(..))) else {
        return Vec::new();
    };
    match &table.data.borrow().value {
        NodeValue::Table(t) => t.alignments.clone(),
        _ => Vec::new(),
    }
}

/// The 0-based column this cell starts at, accounting for any colspan on
/// earlier sibling cells in the same row.
fn column_index<'a>(node: &'a AstNode<'a>) -> usize {
    let mut index = 0;
    let mut prev = node.previous_sibling();
    while let Some(p) = prev {
        index += match p.data.borrow().value {
            NodeValue::TableCell(c) => c.col_span,
            _ => 1,
        };
        prev = p.previous_sibling();
    }
    index
}

fn render_table_cell<'a>(ctx: &mut Context, node: &'a AstNode<'a>, cell: &NodeTableCell) -> fmt::Result {
    let is_header = node.ancestors().any(|n| matches!(n.data.borrow().value, NodeValue::TableHeader));
    let tag = if is_header { "th" } else { "td" };

    let alignments = table_alignments(node);
    let alignment = alignments.get(column_index(node)).copied().unwrap_or(TableAlignment::None);

    let mut attrs = Attributes::default();
    match alignment {
        TableAlignment::Left => attrs.add("align", "left"),
        TableAlignment::Right => attrs.add("align", "right"),
        TableAlignment::Center => attrs.add("align", "center"),
        TableAlignment::None => {}
    }
    if cell.col_span > 1 {
        attrs.add("colspan", &cell.col_span.to_string());
    }

    write!(ctx, "<{}{}>", tag, attrs)?;
    render_children(ctx, node)?;
    write!(ctx, "</{}>", tag)?;
    Ok(())
}

// ---- Text / abbreviation expansion ----

fn render_text(ctx: &mut Context, text: &str) -> fmt::Result {
    if ctx.extension.abbreviations && !ctx.abbreviations.is_empty() {
        return render_text_with_abbreviations(ctx, text);
    }
    ctx.escape(text)
}

/// §4.3 "Abbreviation expansion": Text is scanned for abbreviation
/// occurrences on word boundaries; matches wrap in `<abbr>`, non-matches
/// print as-is (deliberately *not* HTML-encoded — the spec calls out this
/// asymmetry against SpecialText explicitly; see DESIGN.md).
fn render_text_with_abbreviations(ctx: &mut Context, text: &str) -> fmt::Result {
    let abbrevs: Vec<(String, String)> =
        ctx.abbreviations.iter().map(|(k, v)| (k.clone(), v.expansion.clone())).collect();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut out = String::new();
    'outer: while i < chars.len() {
        for (abbr, expansion) in &abbrevs {
            let abbr_chars: Vec<char> = abbr.chars().collect();
            if abbr_chars.is_empty() || i + abbr_chars.len() > chars.len() {
                continue;
            }
            if chars[i..i + abbr_chars.len()] != abbr_chars[..] {
                continue;
            }
            let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
            let after = i + abbr_chars.len();
            let after_ok = after >= chars.len() || !chars[after].is_alphanumeric();
            if before_ok && after_ok {
                out.push_str("<abbr title=\"");
                out.push_str(&html_title_escape(expansion));
                out.push_str("\">");
                out.push_str(abbr);
                out.push_str("</abbr>");
                i = after;
                continue 'outer;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    ctx.write_str(&out)
}

fn html_title_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

// ---- Emphasis / quotes ----

fn render_emphasis<'a>(ctx: &mut Context, node: &'a AstNode<'a>, tag: &str, opening_chars: &str, closed: bool) -> fmt::Result {
    if !closed {
        ctx.escape(opening_chars)?;
        return render_children(ctx, node);
    }
    write!(ctx, "<{}>", tag)?;
    render_children(ctx, node)?;
    write!(ctx, "</{}>", tag)?;
    Ok(())
}

fn render_quoted<'a>(ctx: &mut Context, node: &'a AstNode<'a>, kind: QuoteType) -> fmt::Result {
    let (open, close) = match kind {
        QuoteType::Single => ("\u{2018}", "\u{2019}"),
        QuoteType::Double => ("\u{201c}", "\u{201d}"),
        QuoteType::DoubleAngle => ("\u{ab}", "\u{bb}"),
    };
    ctx.write_str(open)?;
    render_children(ctx, node)?;
    ctx.write_str(close)?;
    Ok(())
}

// ---- Links / images (§4.6) ----

enum LeafLinkKind {
    Auto,
    Mail,
    Anchor,
}

enum RichLinkKind {
    Exp,
    Ref,
}

fn link_renderer<'o>(ctx: &Context<'o>) -> std::sync::Arc<dyn LinkRenderer> {
    ctx.plugins.link_renderer.clone().unwrap_or_else(|| std::sync::Arc::new(DefaultLinkRenderer))
}

fn write_opening_link_tag(ctx: &mut Context, rendering: &Rendering) -> fmt::Result {
    ctx.write_str("<a href=\"")?;
    ctx.escape_href(&rendering.href)?;
    ctx.write_str("\"")?;
    write!(ctx, "{}", rendering.attributes)?;
    ctx.write_str(">")
}

fn render_leaf_link(ctx: &mut Context, kind: LeafLinkKind, link: &crate::nodes::NodeLink) -> fmt::Result {
    let renderer = link_renderer(ctx);
    let literal = match kind {
        LeafLinkKind::Mail => link.url.trim_start_matches("mailto:").to_string(),
        _ => link.url.clone(),
    };
    let rendering = match kind {
        LeafLinkKind::Auto => renderer.auto_link(link, &literal),
        LeafLinkKind::Mail => renderer.mail_link(link, &literal),
        LeafLinkKind::Anchor => renderer.anchor_link(link, &literal),
    };
    write_opening_link_tag(ctx, &rendering)?;
    ctx.write_str(&rendering.text)?;
    ctx.write_str("</a>")
}

fn render_wikilink(ctx: &mut Context, w: &crate::nodes::NodeWikiLink) -> fmt::Result {
    let renderer = link_renderer(ctx);
    let rendering = renderer.wiki_link(w, "");
    write_opening_link_tag(ctx, &rendering)?;
    ctx.write_str(&rendering.text)?;
    ctx.write_str("</a>")
}

/// Explicit `[text](url "title")` links: `text` wraps rendered children
/// (possibly rich inline markup), so it never goes through the
/// `LinkRenderer`'s `text` parameter the way leaf links do.
fn render_rich_link<'a>(ctx: &mut Context, node: &'a AstNode<'a>, kind: RichLinkKind, link: &crate::nodes::NodeLink) -> fmt::Result {
    let renderer = link_renderer(ctx);
    let rendering = match kind {
        RichLinkKind::Exp => renderer.exp_link(link, ""),
        RichLinkKind::Ref => renderer.ref_link(link, ""),
    };
    write_opening_link_tag(ctx, &rendering)?;
    render_children(ctx, node)?;
    ctx.write_str("</a>")
}

fn render_image(ctx: &mut Context, rendering: &Rendering, alt: &str) -> fmt::Result {
    ctx.write_str("<img src=\"")?;
    ctx.escape_href(&rendering.href)?;
    ctx.write_str("\" alt=\"")?;
    ctx.escape(alt)?;
    ctx.write_str("\"")?;
    write!(ctx, "{}", rendering.attributes)?;
    ctx.write_str("/>")
}

fn render_rich_image<'a>(ctx: &mut Context, node: &'a AstNode<'a>, link: &crate::nodes::NodeLink) -> fmt::Result {
    let alt = collect_text(node);
    let renderer = link_renderer(ctx);
    let rendering = renderer.exp_image(link, &alt);
    render_image(ctx, &rendering, &alt)
}

/// Resolves a `RefLink`/`RefImage` against `ctx.references` at serialization
/// time (§4.1.3, §4.3): an explicit key (including the dummy sentinel)
/// normalizes and looks up directly; a bare `[text]` normalizes its own
/// rendered text as the lookup key.
fn render_reflink<'a>(ctx: &mut Context, node: &'a AstNode<'a>, r: &crate::nodes::NodeRefLink, image: bool) -> fmt::Result {
    let text = collect_text(node);
    let key = match &r.reference_key {
        Some(k) if k != crate::nodes::DUMMY_REFERENCE_KEY => crate::strings::normalize_reference_label(k),
        _ => crate::strings::normalize_reference_label(&text),
    };
    let Some(reference) = ctx.references.get(&key).cloned() else {
        // Unresolved reference: fall back to the literal bracket text.
        if image {
            ctx.write_str("![")?;
        } else {
            ctx.write_str("[")?;
        }
        render_children(ctx, node)?;
        return ctx.write_str("]");
    };
    let link = crate::nodes::NodeLink { url: reference.url, title: reference.title };
    let renderer = link_renderer(ctx);
    if image {
        let rendering = renderer.ref_image(&link, &text);
        render_image(ctx, &rendering, &text)
    } else {
        let rendering = renderer.ref_link(&link, "");
        write_opening_link_tag(ctx, &rendering)?;
        render_children(ctx, node)?;
        ctx.write_str("</a>")
    }
}

// ---- Footnotes (§4.3 "Footnotes") ----

fn render_footnote_ref(ctx: &mut Context, label: &str) -> fmt::Result {
    let n = ctx.footnote_number(label);
    write!(ctx, "<sup id=\"fnref-{n}\"><a href=\"#fn-{n}\">{n}</a></sup>")
}

fn render_footnotes<'a>(ctx: &mut Context, defs: &[&'a AstNode<'a>]) -> fmt::Result {
    let mut numbered: Vec<(u32, &'a AstNode<'a>)> = defs
        .iter()
        .filter_map(|&d| match &d.data.borrow().value {
            NodeValue::FootnoteDef(label) => ctx.referenced_footnotes.get(label).map(|&n| (n, d)),
            _ => None,
        })
        .collect();
    numbered.sort_by_key(|(n, _)| *n);

    ctx.cr()?;
    ctx.write_str("<div class=\"footnotes\"><hr/><ol>")?;
    ctx.cr()?;
    for (n, def) in numbered {
        write!(ctx, "<li id=\"fn-{n}\">")?;
        render_children(ctx, def)?;
        ctx.write_str("</li>")?;
        ctx.cr()?;
    }
    ctx.write_str("</ol></div>")?;
    ctx.cr()?;
    Ok(())
}

// ---- `[TOC]` (§3.2 Invariant 7) ----

/// Collects every `Heading` in document order regardless of where the
/// `Toc` node itself sits, and renders a nested `<ul>` of anchors using the
/// ids already computed in [`precompute_heading_anchors`].
fn render_toc<'a>(ctx: &mut Context, node: &'a AstNode<'a>) -> fmt::Result {
    let Some(root) = node.ancestors().last() else { return Ok(()) };
    let headings: Vec<&'a AstNode<'a>> =
        root.descendants().filter(|n| matches!(n.data.borrow().value, NodeValue::Heading(..))).collect();

    ctx.cr()?;
    ctx.write_str("<ul>")?;
    ctx.cr()?;
    for heading in headings {
        let text = collect_text(heading);
        let start_index = heading.data.borrow().start_index;
        ctx.write_str("<li>")?;
        if let Some(id) = ctx.header_anchor_ids.get(&start_index).cloned() {
            write!(ctx, "<a href=\"#{}\">", id)?;
            ctx.escape(&text)?;
            ctx.write_str("</a>")?;
        } else {
            ctx.escape(&text)?;
        }
        ctx.write_str("</li>")?;
        ctx.cr()?;
    }
    ctx.write_str("</ul>")?;
    ctx.cr()?;
    Ok(())
}

// ---- Escaping (used by `Context::escape`/`escape_href`) ----

/// Escapes `&`, `<`, `>`, `"` for text/attribute content, grounded on the
/// teacher's `escape()` in `src/html.rs`.
pub fn escape(s: &str) -> String {
    let matcher = jetscii::bytes!(b'"', b'&', b'<', b'>');
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut offset = 0;
    while let Some(i) = matcher.find(&bytes[offset..]) {
        let esc: &str = match bytes[offset + i] {
            b'"' => "&quot;",
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => unreachable!(),
        };
        out.push_str(&s[offset..offset + i]);
        out.push_str(esc);
        offset += i + 1;
    }
    out.push_str(&s[offset..]);
    out
}

const HREF_SAFE: [bool; 256] = character_set!(
    b"-_.+!*(),%#@?=;:/,+$~",
    b"abcdefghijklmnopqrstuvwxyz",
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
);

/// Percent-encodes an href, leaving a fixed safe set untouched, matching the
/// teacher's `escape_href()`.
pub fn escape_href(s: &str) -> String {
    let bytes = s.as_bytes();
    let size = bytes.len();
    let mut out = String::with_capacity(size);
    let mut i = 0;
    while i < size {
        let org = i;
        while i < size && HREF_SAFE[bytes[i] as usize] {
            i += 1;
        }
        if i > org {
            out.push_str(&s[org..i]);
        }
        if i >= size {
            break;
        }
        match bytes[i] {
            b'&' => out.push_str("&amp;"),
            b'\'' => out.push_str("&#x27;"),
            _ => out.push_str(&format!("%{:02X}", bytes[i])),
        }
        i += 1;
    }
    out
}
