use core_text::InlineSpan;
use tracing::warn;

use crate::inline::parse_inline;

const MAX_TABLE_COLUMNS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<(String, Vec<InlineSpan>)>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
        spans: Vec<InlineSpan>,
    },
    Paragraph {
        text: String,
        spans: Vec<InlineSpan>,
    },
    BlockQuote {
        depth: usize,
        text: String,
        spans: Vec<InlineSpan>,
    },
    ListItem {
        ordered: bool,
        index: Option<u64>,
        depth: usize,
        text: String,
        spans: Vec<InlineSpan>,
    },
    Table {
        alignments: Vec<Alignment>,
        header: TableRow,
        rows: Vec<TableRow>,
    },
}

/// Parse a strict subset of Markdown into a flat list of blocks. Blocks are
/// detected line-by-line in a fixed peek order: heading, blockquote,
/// ordered list, unordered list, table, then paragraph. There is no
/// reflowing across blank-line boundaries beyond what each detector does
/// on its own.
pub fn parse_blocks(source: &str) -> Vec<Block> {
    let lines: Vec<&str> = source.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0usize;

    while i < lines.len() {
        let raw = lines[i];
        if raw.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some(block) = try_heading(raw) {
            blocks.push(block);
            i += 1;
            continue;
        }

        if let Some((depth, content)) = try_blockquote(raw) {
            let (text, spans) = parse_inline(content);
            blocks.push(Block::BlockQuote { depth, text, spans });
            i += 1;
            continue;
        }

        if let Some((depth, index, content)) = try_ordered_list(raw) {
            let (text, spans) = parse_inline(content);
            blocks.push(Block::ListItem {
                ordered: true,
                index: Some(index),
                depth,
                text,
                spans,
            });
            i += 1;
            continue;
        }

        if let Some((depth, content)) = try_unordered_list(raw) {
            let (text, spans) = parse_inline(content);
            blocks.push(Block::ListItem {
                ordered: false,
                index: None,
                depth,
                text,
                spans,
            });
            i += 1;
            continue;
        }

        if let Some((table, consumed)) = try_table(&lines[i..]) {
            blocks.push(table);
            i += consumed;
            continue;
        }

        let (text, spans) = parse_inline(raw.trim());
        blocks.push(Block::Paragraph { text, spans });
        i += 1;
    }

    blocks
}

fn try_heading(line: &str) -> Option<Block> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = trimmed[hashes..].trim_start();
    if hashes == trimmed.len() {
        // a bare run of `#` with nothing after it is not a heading
        return None;
    }
    let level = hashes.min(3) as u8;
    let (text, spans) = parse_inline(rest);
    Some(Block::Heading { level, text, spans })
}

fn indent_depth(line: &str) -> (usize, &str) {
    let mut units = 0usize;
    let mut idx = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => {
                units += 1;
                idx += 1;
            }
            '\t' => {
                units += 4;
                idx += 1;
            }
            _ => break,
        }
    }
    (units / 2, &line[idx..])
}

fn try_blockquote(line: &str) -> Option<(usize, &str)> {
    let (depth, rest) = indent_depth(line);
    let rest = rest.strip_prefix('>')?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    Some((depth, rest))
}

fn try_ordered_list(line: &str) -> Option<(usize, u64, &str)> {
    let (depth, rest) = indent_depth(line);
    let digits_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }
    let after_digits = &rest[digits_len..];
    let marker = after_digits.strip_prefix('.').or_else(|| after_digits.strip_prefix(')'))?;
    let marker = marker.strip_prefix(' ').unwrap_or(marker);
    let index: u64 = rest[..digits_len].parse().ok()?;
    Some((depth, index, marker))
}

fn try_unordered_list(line: &str) -> Option<(usize, &str)> {
    let (depth, rest) = indent_depth(line);
    let mut chars = rest.chars();
    match chars.next() {
        Some('-') | Some('*') | Some('+') => {}
        _ => return None,
    }
    let remainder = &rest[1..];
    let remainder = remainder.strip_prefix(' ')?;
    Some((depth, remainder))
}

fn try_table(lines: &[&str]) -> Option<(Block, usize)> {
    if lines.len() < 2 {
        return None;
    }
    let header_line = lines[0].trim();
    if !header_line.contains('|') {
        return None;
    }
    let alignments = parse_separator_row(lines[1])?;

    let header_cells = split_row(header_line, alignments.len());
    let header = make_row(header_cells);

    let mut rows = Vec::new();
    let mut consumed = 2usize;
    for line in &lines[2..] {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.contains('|') {
            break;
        }
        rows.push(make_row(split_row(trimmed, alignments.len())));
        consumed += 1;
    }

    Some((
        Block::Table {
            alignments,
            header,
            rows,
        },
        consumed,
    ))
}

fn parse_separator_row(line: &str) -> Option<Vec<Alignment>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<&str> = trimmed
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect();
    if cells.is_empty() {
        return None;
    }
    let mut alignments = Vec::with_capacity(cells.len().min(MAX_TABLE_COLUMNS));
    for (i, cell) in cells.iter().enumerate() {
        if i >= MAX_TABLE_COLUMNS {
            warn!(
                target: "core_markdown::block",
                columns = cells.len(),
                "table exceeds {} columns, truncating",
                MAX_TABLE_COLUMNS
            );
            break;
        }
        let body = cell.trim_matches(':');
        if body.is_empty() || !body.chars().all(|c| c == '-') {
            return None;
        }
        let left = cell.starts_with(':');
        let right = cell.ends_with(':');
        alignments.push(match (left, right) {
            (true, true) => Alignment::Center,
            (false, true) => Alignment::Right,
            _ => Alignment::Left,
        });
    }
    Some(alignments)
}

fn split_row(line: &str, expected_cols: usize) -> Vec<&str> {
    let trimmed = line.trim().trim_matches('|');
    let mut cells: Vec<&str> = trimmed.split('|').map(str::trim).collect();
    cells.truncate(expected_cols.max(1));
    cells
}

fn make_row(cells: Vec<&str>) -> TableRow {
    TableRow {
        cells: cells.into_iter().map(|c| parse_inline(c)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels_are_capped_at_three() {
        let blocks = parse_blocks("###### deep");
        match &blocks[0] {
            Block::Heading { level, text, .. } => {
                assert_eq!(*level, 3);
                assert_eq!(text, "deep");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn blockquote_tracks_nesting_depth() {
        let blocks = parse_blocks("  > nested quote");
        match &blocks[0] {
            Block::BlockQuote { depth, text, .. } => {
                assert_eq!(*depth, 1);
                assert_eq!(text, "nested quote");
            }
            other => panic!("expected blockquote, got {other:?}"),
        }
    }

    #[test]
    fn ordered_list_parses_index_and_body() {
        let blocks = parse_blocks("3. third item");
        match &blocks[0] {
            Block::ListItem {
                ordered,
                index,
                text,
                ..
            } => {
                assert!(*ordered);
                assert_eq!(*index, Some(3));
                assert_eq!(text, "third item");
            }
            other => panic!("expected list item, got {other:?}"),
        }
    }

    #[test]
    fn unordered_list_accepts_dash_star_and_plus() {
        for marker in ["- a", "* a", "+ a"] {
            let blocks = parse_blocks(marker);
            assert!(matches!(blocks[0], Block::ListItem { ordered: false, .. }));
        }
    }

    #[test]
    fn table_with_alignment_row_is_detected() {
        let src = "a | b\n--- | ---:\n1 | 2";
        let blocks = parse_blocks(src);
        match &blocks[0] {
            Block::Table {
                alignments, rows, ..
            } => {
                assert_eq!(alignments, &[Alignment::Left, Alignment::Right]);
                assert_eq!(rows.len(), 1);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn missing_separator_row_falls_back_to_paragraph() {
        let blocks = parse_blocks("a | b\nnot a separator");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn plain_text_is_a_paragraph() {
        let blocks = parse_blocks("just some text");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }
}
