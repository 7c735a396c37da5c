use core_error::Result;
use core_fonts::FontRegistry;
use core_geom::{BBox, Mm, PathCollection, Point, Transform};
use core_text::{layout_text, Alignment, LayoutOptions, TextLayout};

use crate::block::{parse_blocks, Block, TableRow};
use crate::options::MarkdownOptions;

/// Geometry produced by rendering a full Markdown document: one combined
/// path collection plus the bounding box it occupies, both in page-local
/// millimeters with the origin at the top-left of the first block.
#[derive(Debug, Clone)]
pub struct MarkdownLayout {
    pub paths: PathCollection<Mm>,
    pub bbox: Option<BBox<Mm>>,
    pub blocks_rendered: usize,
}

const LIST_INDENT_MM: f64 = 6.0;
const BULLET_GUTTER_MM: f64 = 4.0;
const QUOTE_BAR_MM: f64 = 1.0;
const QUOTE_GUTTER_MM: f64 = 2.0;
const TABLE_CELL_PADDING_MM: f64 = 1.5;

/// Render a parsed Markdown document into page-local geometry. Each block
/// is laid out independently through `core_text::layout_text` at a y
/// offset accumulated from the blocks rendered so far; nothing here
/// reflows across block boundaries.
pub fn render_markdown(
    source: &str,
    options: &MarkdownOptions,
    registry: &FontRegistry,
) -> Result<MarkdownLayout> {
    let blocks = parse_blocks(source);
    let block_gap_mm = 0.5 * options.base_pt * 25.4 / 72.0;

    let mut combined = PathCollection::new();
    let mut bbox: Option<BBox<Mm>> = None;
    let mut y_offset = 0.0;
    let mut blocks_rendered = 0usize;

    for block in &blocks {
        let rendered = render_block(block, options, registry, y_offset)?;
        if let Some(layout) = rendered {
            let moved = layout.paths;
            for path in moved.paths {
                combined.paths.push(path);
            }
            if let Some(b) = layout.bbox {
                bbox = Some(match bbox {
                    Some(existing) => existing.union(&b),
                    None => b,
                });
                y_offset = b.max.y + block_gap_mm;
            } else {
                y_offset += block_gap_mm;
            }
            blocks_rendered += 1;
        }
    }

    Ok(MarkdownLayout {
        paths: combined,
        bbox,
        blocks_rendered,
    })
}

fn render_block(
    block: &Block,
    options: &MarkdownOptions,
    registry: &FontRegistry,
    y_offset: f64,
) -> Result<Option<TextLayout>> {
    match block {
        Block::Heading { level, text, spans } => {
            let pt = options.heading_pts[(*level as usize).saturating_sub(1).min(2)];
            let layout_options = base_layout_options(options, pt, options.frame_width_mm);
            let layout = layout_text(text, spans, &layout_options, registry)?;
            Ok(Some(offset_layout(layout, 0.0, y_offset)))
        }
        Block::Paragraph { text, spans } => {
            let layout_options = base_layout_options(options, options.base_pt, options.frame_width_mm);
            let layout = layout_text(text, spans, &layout_options, registry)?;
            Ok(Some(offset_layout(layout, 0.0, y_offset)))
        }
        Block::BlockQuote { depth, text, spans } => {
            let indent = QUOTE_GUTTER_MM + QUOTE_BAR_MM + (*depth as f64) * LIST_INDENT_MM;
            let frame = (options.frame_width_mm - indent).max(1.0);
            let layout_options = base_layout_options(options, options.base_pt, frame);
            let layout = layout_text(text, spans, &layout_options, registry)?;
            let mut offset = offset_layout(layout, indent, y_offset);
            add_quote_bar(&mut offset, depth_indent(*depth), y_offset);
            Ok(Some(offset))
        }
        Block::ListItem {
            depth,
            index,
            text,
            spans,
            ordered,
        } => {
            let indent = (*depth as f64) * LIST_INDENT_MM + BULLET_GUTTER_MM;
            let frame = (options.frame_width_mm - indent).max(1.0);
            let layout_options = base_layout_options(options, options.base_pt, frame);
            let label_text = if *ordered {
                format!("{}.", index.unwrap_or(1))
            } else {
                "\u{2022}".to_string()
            };
            let (label_text, label_spans) = (label_text, Vec::new());
            let label_layout = layout_text(&label_text, &label_spans, &layout_options, registry)?;
            let body_layout = layout_text(text, spans, &layout_options, registry)?;

            let mut merged = offset_layout(label_layout, indent - BULLET_GUTTER_MM, y_offset);
            let body = offset_layout(body_layout, indent, y_offset);
            merge_layout(&mut merged, body);
            Ok(Some(merged))
        }
        Block::Table {
            alignments,
            header,
            rows,
        } => render_table(alignments, header, rows, options, registry, y_offset).map(Some),
    }
}

fn depth_indent(depth: usize) -> f64 {
    (depth as f64) * LIST_INDENT_MM
}

fn base_layout_options(options: &MarkdownOptions, pt: f64, frame_width_mm: f64) -> LayoutOptions {
    LayoutOptions {
        family_hint: options.family_hint.clone(),
        point_size_pt: pt,
        frame_width_mm,
        alignment: options.alignment,
        hyphenate: options.hyphenate,
        line_spacing_multiplier: options.line_spacing_multiplier,
        break_long_words: options.break_long_words,
    }
}

fn offset_layout(mut layout: TextLayout, x: f64, y: f64) -> TextLayout {
    let transform = Transform::translation(x, y);
    let moved = transform.apply_collection(&layout.paths);
    layout.paths = moved;
    layout.bbox = layout.bbox.map(|b| b.translate(x, y));
    for line in &mut layout.lines {
        line.x_offset_mm += x;
        line.baseline_y_mm += y;
    }
    layout
}

fn merge_layout(base: &mut TextLayout, other: TextLayout) {
    for path in other.paths.paths {
        base.paths.paths.push(path);
    }
    base.bbox = match (base.bbox, other.bbox) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    };
    base.lines.extend(other.lines);
    base.stats.rendered_glyphs += other.stats.rendered_glyphs;
    base.stats.missing_glyphs += other.stats.missing_glyphs;
    base.stats.missing_breaks += other.stats.missing_breaks;
}

fn add_quote_bar(layout: &mut TextLayout, indent: f64, y_offset: f64) {
    let height = layout
        .bbox
        .map(|b| (b.max.y - y_offset).max(1.0))
        .unwrap_or(1.0);
    let x = indent + QUOTE_GUTTER_MM * 0.25;
    let bar = core_geom::Path::from_points(vec![
        Point::new(x, y_offset),
        Point::new(x, y_offset + height),
    ]);
    layout.paths.paths.push(bar);
}

fn render_table(
    alignments: &[Alignment_],
    header: &TableRow,
    rows: &[TableRow],
    options: &MarkdownOptions,
    registry: &FontRegistry,
    y_offset: f64,
) -> Result<TextLayout> {
    let cols = alignments.len().max(1);
    let col_width = options.frame_width_mm / cols as f64;

    let mut merged: Option<TextLayout> = None;
    let mut y = y_offset;

    let mut render_row = |row: &TableRow, y: f64| -> Result<TextLayout> {
        let mut row_layout: Option<TextLayout> = None;
        for (col, (text, spans)) in row.cells.iter().enumerate() {
            let frame = (col_width - 2.0 * TABLE_CELL_PADDING_MM).max(1.0);
            let alignment = alignments.get(col).copied().unwrap_or(Alignment_::Left);
            let mut layout_options = base_layout_options(options, options.base_pt, frame);
            layout_options.alignment = to_text_alignment(alignment);
            let cell_layout = layout_text(text, spans, &layout_options, registry)?;
            let x = col as f64 * col_width + TABLE_CELL_PADDING_MM;
            let placed = offset_layout(cell_layout, x, y);
            match &mut row_layout {
                Some(existing) => merge_layout(existing, placed),
                None => row_layout = Some(placed),
            }
        }
        Ok(row_layout.unwrap_or_else(empty_layout))
    };

    let header_layout = render_row(header, y)?;
    let header_height = row_height(&header_layout, y, options.base_pt);
    y += header_height;
    match &mut merged {
        Some(existing) => merge_layout(existing, header_layout),
        None => merged = Some(header_layout),
    }

    for row in rows {
        let row_layout = render_row(row, y)?;
        let height = row_height(&row_layout, y, options.base_pt);
        y += height;
        match &mut merged {
            Some(existing) => merge_layout(existing, row_layout),
            None => merged = Some(row_layout),
        }
    }

    Ok(merged.unwrap_or_else(empty_layout))
}

fn row_height(layout: &TextLayout, y_top: f64, base_pt: f64) -> f64 {
    let line_height_mm = base_pt * 25.4 / 72.0 * 1.2;
    let min_height = line_height_mm + 2.0 * TABLE_CELL_PADDING_MM;
    match layout.bbox {
        Some(b) => (b.max.y - y_top + TABLE_CELL_PADDING_MM).max(min_height),
        None => min_height,
    }
}

fn empty_layout() -> TextLayout {
    TextLayout {
        paths: PathCollection::new(),
        bbox: None,
        lines: Vec::new(),
        stats: Default::default(),
    }
}

use crate::block::Alignment as Alignment_;

fn to_text_alignment(a: Alignment_) -> Alignment {
    match a {
        Alignment_::Left => Alignment::Left,
        Alignment_::Center => Alignment::Center,
        Alignment_::Right => Alignment::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_fonts::{FontFace, Glyph, Style};

    fn test_registry() -> FontRegistry {
        let glyphs: Vec<Glyph> = "abcdefghijklmnopqrstuvwxyz .,:-\u{2022}1234567890"
            .chars()
            .map(|c| Glyph::new(c as u32, 400.0, Vec::new()))
            .collect();
        let face = FontFace::new(
            "default-sans",
            "Body",
            "test",
            Style::REGULAR,
            core_fonts::FaceMetrics::default_for_units_per_em(1000.0),
            glyphs,
        );
        FontRegistry::from_faces(vec![face])
    }

    #[test]
    fn heading_and_paragraph_stack_vertically() {
        let registry = test_registry();
        let options = MarkdownOptions::default();
        let layout = render_markdown("# Title\n\nbody text here", &options, &registry).unwrap();
        assert_eq!(layout.blocks_rendered, 2);
        assert!(layout.bbox.is_some());
    }

    #[test]
    fn table_renders_header_and_rows() {
        let registry = test_registry();
        let options = MarkdownOptions::default();
        let src = "a | b\n--- | ---\n1 | 2\n3 | 4";
        let layout = render_markdown(src, &options, &registry).unwrap();
        assert_eq!(layout.blocks_rendered, 1);
        assert!(layout.bbox.is_some());
    }

    #[test]
    fn list_items_indent_past_the_bullet() {
        let registry = test_registry();
        let options = MarkdownOptions::default();
        let layout = render_markdown("- one\n- two", &options, &registry).unwrap();
        assert_eq!(layout.blocks_rendered, 2);
    }
}
