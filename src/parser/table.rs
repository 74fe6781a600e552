//! GFM-style pipe table parsing (`tables` extension), grounded on the
//! teacher's `parser/table.rs`: a header row, a delimiter row fixing column
//! count and alignment, then zero or more body rows. Generalized here to
//! also record per-cell colspan from a run of trailing empty cells
//! (§3.1 `NodeTableCell.col_span`), which the teacher's table module does
//! not need since it doesn't support colspan.

use crate::error::Error;
use crate::nodes::{AstNode, NodeTable, NodeTableCell, NodeTableColumn, NodeValue, TableAlignment};
use crate::scanners;

use super::{BlockParser, Line};

pub(crate) fn try_table<'a, 'b>(
    bp: &mut BlockParser<'a, 'b>,
    lines: &[Line],
    li: usize,
) -> Result<Option<(&'a AstNode<'a>, usize)>, Error> {
    if !scanners::looks_like_table_row(&lines[li].text) {
        return Ok(None);
    }
    if li + 1 >= lines.len() || !scanners::table_delimiter_row(&lines[li + 1].text) {
        return Ok(None);
    }

    let alignments = parse_alignments(&lines[li + 1].text);
    let start = lines[li].start;

    let table_node = bp.alloc(NodeValue::Table(NodeTable { alignments: alignments.clone() }), start, start);

    for &alignment in &alignments {
        table_node.append(bp.alloc(NodeValue::TableColumn(NodeTableColumn { alignment }), start, start));
    }

    let header_row = bp.alloc(NodeValue::TableRow, lines[li].start, lines[li].end_nl);
    for cell in parse_row_cells(bp, &lines[li], &alignments)? {
        header_row.append(cell);
    }
    let header = bp.alloc(NodeValue::TableHeader, lines[li].start, lines[li].end_nl);
    header.append(header_row);
    table_node.append(header);

    let mut j = li + 2;
    let body = bp.alloc(NodeValue::TableBody, lines[li + 1].end_nl, lines[li + 1].end_nl);
    while j < lines.len() && !scanners::is_blank(&lines[j].text) && scanners::looks_like_table_row(&lines[j].text) {
        let row = bp.alloc(NodeValue::TableRow, lines[j].start, lines[j].end_nl);
        for cell in parse_row_cells(bp, &lines[j], &alignments)? {
            row.append(cell);
        }
        body.append(row);
        j += 1;
    }
    table_node.append(body);

    let end = lines[j - 1].end_nl;
    table_node.data.borrow_mut().end_index = end;
    body.data.borrow_mut().end_index = end;

    Ok(Some((table_node, j)))
}

fn parse_alignments(delimiter_line: &str) -> Vec<TableAlignment> {
    let trimmed = delimiter_line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed
        .split('|')
        .map(|cell| {
            let cell = cell.trim();
            let left = cell.starts_with(':');
            let right = cell.ends_with(':');
            match (left, right) {
                (true, true) => TableAlignment::Center,
                (true, false) => TableAlignment::Left,
                (false, true) => TableAlignment::Right,
                (false, false) => TableAlignment::None,
            }
        })
        .collect()
}

fn split_row_cells(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'|') {
            current.push('|');
            chars.next();
        } else if c == '|' {
            cells.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Builds one row's `TableCell` nodes, collapsing a run of trailing empty
/// cells into the preceding cell's `col_span` so a short row still lines up
/// against the header's column count.
fn parse_row_cells<'a, 'b>(
    bp: &BlockParser<'a, 'b>,
    line: &Line,
    alignments: &[TableAlignment],
) -> Result<Vec<&'a AstNode<'a>>, Error> {
    let raw_cells = split_row_cells(&line.text);
    let mut nodes = Vec::with_capacity(raw_cells.len());
    let mut i = 0;
    while i < raw_cells.len() {
        let mut span = 1;
        let mut j = i + 1;
        while j < raw_cells.len() && raw_cells[j].is_empty() {
            span += 1;
            j += 1;
        }
        let cell = bp.alloc(NodeValue::TableCell(NodeTableCell { col_span: span }), line.start, line.end);
        for c in bp.inline_text(&raw_cells[i], line.start, line.end)? {
            cell.append(c);
        }
        nodes.push(cell);
        i = j.max(i + 1);
    }
    Ok(nodes)
}
