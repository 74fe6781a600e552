//! Hand-rolled look-ahead scanners for block-level openers.
//!
//! The teacher's historical `scanners.rs` generated a `pest`/re2c grammar;
//! the modern crate (and this one, since `Cargo.toml` carries no `pest`
//! dependency) instead uses small recursive-descent predicates operating
//! directly on a `&str` line, mirroring the style of `parser/mod.rs`'s
//! hand-written block dispatch.

use crate::ctype::isspace_char;

/// Number of leading spaces, counting a tab as advancing to the next
/// multiple of `TAB_STOP` (4), consistent with `parser::TAB_STOP`.
pub fn leading_indent(line: &str) -> usize {
    let mut indent = 0;
    for c in line.chars() {
        match c {
            ' ' => indent += 1,
            '\t' => indent += 4 - (indent % 4),
            _ => break,
        }
    }
    indent
}

pub fn is_blank(line: &str) -> bool {
    line.chars().all(isspace_char)
}

/// ATX heading opener: 1-6 `#` then a space/tab or end of line (or,
/// if the `atx-header-space` extension relaxes the rule, no space at all).
/// Returns the heading level and the byte offset where the heading content
/// begins.
pub fn atx_heading(line: &str, require_space: bool) -> Option<(u8, usize)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i] == b'#' {
        i += 1;
    }
    if i == 0 || i > 6 {
        return None;
    }
    if i == bytes.len() {
        return Some((i as u8, i));
    }
    let next = bytes[i];
    if next == b' ' || next == b'\t' {
        let mut j = i;
        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        Some((i as u8, j))
    } else if !require_space {
        Some((i as u8, i))
    } else {
        None
    }
}

/// Setext underline: a line of only `=` (level 1) or only `-` (level 2),
/// optionally followed by trailing whitespace. A lone `-` is excluded
/// (requires at least two) since it would otherwise be indistinguishable
/// from the start of a new empty bullet list item.
pub fn setext_heading_underline(line: &str) -> Option<u8> {
    let trimmed = line.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if trimmed.len() > 1 && trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

/// Thematic break: a line (after indent) of 3+ of the same character among
/// `*`, `-`, `_`, optionally interspersed with spaces. `relaxed` allows
/// mixing characters (the `relaxed-hrules` extension).
pub fn thematic_break(line: &str, relaxed: bool) -> bool {
    let mut counts = [0usize; 3]; // *, -, _
    let mut first: Option<char> = None;
    for c in line.trim_end().chars() {
        match c {
            '*' | '-' | '_' => {
                if !relaxed {
                    match first {
                        None => first = Some(c),
                        Some(f) if f != c => return false,
                        _ => {}
                    }
                }
                let idx = match c {
                    '*' => 0,
                    '-' => 1,
                    _ => 2,
                };
                counts[idx] += 1;
            }
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    counts.iter().any(|&n| n >= 3)
}

/// Fenced code block opener: 3+ backticks or 3+ tildes, optional info
/// string. Returns `(fence_char, fence_length, info_string)`.
pub fn fence_opener(line: &str) -> Option<(char, usize, String)> {
    let trimmed = line.trim_start();
    let fence_char = trimmed.chars().next()?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == fence_char).count();
    if len < 3 {
        return None;
    }
    let rest: String = trimmed.chars().skip(len).collect();
    if fence_char == '`' && rest.contains('`') {
        // Backtick fences can't have a backtick in the info string.
        return None;
    }
    Some((fence_char, len, rest.trim().to_string()))
}

/// Whether `line` closes a fence opened with `(fence_char, fence_length)`.
/// Per the spec, a fence line using the *other* character never closes —
/// it is ordinary content inside the block.
pub fn fence_closer(line: &str, fence_char: char, fence_length: usize) -> bool {
    let trimmed = line.trim();
    if leading_indent(line) >= 4 {
        return false;
    }
    if !trimmed.chars().all(|c| c == fence_char) {
        return false;
    }
    trimmed.chars().count() >= fence_length
}

/// Block quote marker: an optional `>` (with at most 3 leading spaces of
/// indent), optionally followed by one space. Returns the byte offset past
/// the marker, or `None` if the line doesn't open/continue a block quote.
pub fn block_quote_marker(line: &str) -> Option<usize> {
    let indent = leading_indent(line);
    if indent >= 4 {
        return None;
    }
    let mut chars = line.char_indices();
    let mut consumed_indent = 0;
    let mut idx = 0;
    for (i, c) in &mut chars {
        if c == ' ' && consumed_indent < indent {
            consumed_indent += 1;
            idx = i + 1;
            continue;
        }
        if c == '>' {
            idx = i + 1;
            let rest = &line[idx..];
            if let Some(stripped) = rest.strip_prefix(' ') {
                return Some(line.len() - stripped.len());
            }
            return Some(idx);
        }
        return None;
    }
    None
}

/// A table row: at least one unescaped `|`, ignoring `|` preceded by `\`.
pub fn looks_like_table_row(line: &str) -> bool {
    let mut prev = '\0';
    for c in line.chars() {
        if c == '|' && prev != '\\' {
            return true;
        }
        prev = c;
    }
    false
}

/// A table delimiter row: cells made only of `-`, optionally wrapped in
/// `:`, separated by `|`. Requires at least two pipe-separated cells, or
/// an actual leading/trailing `|`, so a bare single-cell line with no
/// pipes at all (e.g. `"-"`) is never mistaken for a delimiter row.
pub fn table_delimiter_row(line: &str) -> bool {
    let trimmed = line.trim();
    let had_leading_pipe = trimmed.starts_with('|');
    let had_trailing_pipe = trimmed.ends_with('|');
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return false;
    }
    let cells: Vec<&str> = trimmed.split('|').collect();
    if cells.len() < 2 && !had_leading_pipe && !had_trailing_pipe {
        return false;
    }
    cells.into_iter().all(|cell| {
        let cell = cell.trim();
        if cell.is_empty() {
            return false;
        }
        let cell = cell.strip_prefix(':').unwrap_or(cell);
        let cell = cell.strip_suffix(':').unwrap_or(cell);
        !cell.is_empty() && cell.chars().all(|c| c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx_levels() {
        assert_eq!(atx_heading("# Title", true), Some((1, 2)));
        assert_eq!(atx_heading("### Title", true), Some((3, 4)));
        assert_eq!(atx_heading("####### Title", true), None);
        assert_eq!(atx_heading("#Title", true), None);
        assert_eq!(atx_heading("#Title", false), Some((1, 1)));
    }

    #[test]
    fn hrule_requires_same_char_unless_relaxed() {
        assert!(thematic_break("***", false));
        assert!(!thematic_break("*-*", false));
        assert!(thematic_break("*-*", true));
    }

    #[test]
    fn fence_closer_requires_same_character() {
        assert!(fence_closer("```", '`', 3));
        assert!(!fence_closer("~~~", '`', 3));
    }

    #[test]
    fn table_delimiter_detection() {
        assert!(table_delimiter_row("| --- | :---: | ---: |"));
        assert!(!table_delimiter_row("| a | b |"));
    }

    #[test]
    fn table_delimiter_row_rejects_bare_single_cell_with_no_pipes() {
        assert!(!table_delimiter_row("-"));
        assert!(!table_delimiter_row(":-:"));
    }
}
