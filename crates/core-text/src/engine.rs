use crate::resolver::FaceResolver;
use crate::types::{Alignment, InlineSpan, LayoutOptions, LineMetrics, RenderStats, SpanStyle, TextLayout};
use core_error::{PlotError, Result};
use core_fonts::{select_face, FontRegistry, Style};
use core_geom::{Mm, Path, PathCollection, Point};
use std::collections::{BTreeSet, VecDeque};
use unicode_segmentation::UnicodeSegmentation;

fn pt_to_mm(pt: f64) -> f64 {
    pt * 25.4 / 72.0
}

struct Slot {
    byte_offset: usize,
    style: SpanStyle,
    face_and_synth: Option<(core_fonts::FaceId, bool, bool)>,
    advance_mm: f64,
    codepoint: u32,
}

struct Token {
    slot_start: usize,
    slot_end: usize,
    is_whitespace: bool,
    byte_start: usize,
}

struct LineWip {
    byte_start: usize,
    slot_indices: Vec<usize>,
    width: f64,
    hyphenated: bool,
}

impl LineWip {
    fn new(byte_start: usize) -> Self {
        Self {
            byte_start,
            slot_indices: Vec::new(),
            width: 0.0,
            hyphenated: false,
        }
    }

    fn push_range(&mut self, range: std::ops::Range<usize>, width: f64) {
        self.slot_indices.extend(range);
        self.width += width;
    }
}

pub fn layout_text(
    text: &str,
    spans: &[InlineSpan],
    options: &LayoutOptions,
    registry: &FontRegistry,
) -> Result<TextLayout> {
    if options.frame_width_mm <= 0.0 {
        return Err(PlotError::argument("frame width must be positive"));
    }

    let required: BTreeSet<u32> = text.chars().map(|c| c as u32).collect();
    let selection = select_face(registry, &required, options.family_hint.as_deref())?;
    let base_face = registry
        .face(&selection.face_id)
        .ok_or_else(|| PlotError::internal("selected face vanished from registry"))?;

    let mut stats = RenderStats {
        resolved_family: selection.family_key.clone(),
        ..Default::default()
    };

    if text.is_empty() {
        return Ok(TextLayout {
            paths: PathCollection::new(),
            bbox: None,
            lines: Vec::new(),
            stats,
        });
    }

    let mm_per_unit = pt_to_mm(options.point_size_pt) / base_face.metrics.units_per_em;
    let space_advance_mm = base_face
        .glyph(' ' as u32)
        .map(|g| g.advance_width * mm_per_unit)
        .unwrap_or(base_face.metrics.units_per_em * 0.3 * mm_per_unit);
    let hyphen_advance_mm = base_face
        .glyph('-' as u32)
        .map(|g| g.advance_width * mm_per_unit)
        .unwrap_or(base_face.metrics.units_per_em * 0.3 * mm_per_unit);

    let mut resolver = FaceResolver::new(registry, &selection.family_key);
    let mut slots = Vec::with_capacity(text.len());
    for (byte_offset, ch) in text.char_indices() {
        let style = spans
            .iter()
            .filter(|s| s.covers(byte_offset))
            .fold(SpanStyle::default(), |acc, s| acc.union(&s.style));
        let requested = Style {
            bold: style.bold,
            italic: style.italic,
        };
        let cp = ch as u32;
        let resolved = resolver.resolve(cp, requested);
        let advance_mm = match &resolved {
            Some(r) => {
                let face = registry.face(&r.face_id).expect("cached face must exist");
                let glyph = face.glyph(cp);
                stats.rendered_glyphs += 1;
                glyph.map(|g| g.advance_width * mm_per_unit).unwrap_or(space_advance_mm)
            }
            None => {
                stats.missing_glyphs += 1;
                space_advance_mm
            }
        };
        slots.push(Slot {
            byte_offset,
            style,
            face_and_synth: resolved.map(|r| (r.face_id, r.synthesize_bold, r.synthesize_italic)),
            advance_mm,
            codepoint: cp,
        });
    }

    let tokens = tokenize(text, &slots);
    let (lines_wip, missing_breaks) = pack_lines(tokens, &slots, options, hyphen_advance_mm);
    stats.missing_breaks = missing_breaks;

    let line_height_mm = base_face.metrics.line_height(options.line_spacing_multiplier) * mm_per_unit;
    let ascent_mm = base_face.metrics.ascent * mm_per_unit;

    let mut collection: PathCollection<Mm> = PathCollection::new();
    let mut line_metrics = Vec::with_capacity(lines_wip.len());
    let mut baseline_y = ascent_mm;

    for (i, line) in lines_wip.iter().enumerate() {
        let x_offset = match options.alignment {
            Alignment::Left => 0.0,
            Alignment::Center => (options.frame_width_mm - line.width) / 2.0,
            Alignment::Right => options.frame_width_mm - line.width,
        };
        let mut pen_x = 0.0;
        let mut decoration_runs: Vec<(f64, f64, bool, bool)> = Vec::new(); // start_x, end_x, underline, strike
        let mut current_run: Option<(f64, bool, bool)> = None;

        for &slot_idx in &line.slot_indices {
            let slot = &slots[slot_idx];
            let start_x = pen_x;
            if let Some((face_id, synth_bold, synth_italic)) = &slot.face_and_synth {
                let face = registry.face(face_id).expect("cached face must exist");
                if let Some(glyph) = face.glyph(slot.codepoint) {
                    for stroke in &glyph.strokes {
                        let points: Vec<Point<Mm>> = stroke
                            .iter()
                            .map(|(gx, gy)| {
                                let mut x = *gx;
                                if *synth_italic {
                                    x += gy * 0.2;
                                }
                                let mm_x = x * mm_per_unit + start_x + x_offset;
                                let mm_y = baseline_y - gy * mm_per_unit;
                                Point::new(mm_x, mm_y)
                            })
                            .collect();
                        collection.push(Path::from_points(points.clone()));
                        if *synth_bold {
                            let dx = mm_per_unit * face.metrics.units_per_em * 0.015;
                            let offset_points: Vec<Point<Mm>> =
                                points.iter().map(|p| Point::new(p.x + dx, p.y)).collect();
                            collection.push(Path::from_points(offset_points));
                        }
                    }
                }
            }
            pen_x += slot.advance_mm;
            let has_deco = (slot.style.underline, slot.style.strike);
            match &mut current_run {
                Some((run_start, u, s)) if *u == has_deco.0 && *s == has_deco.1 => {
                    let _ = run_start;
                }
                _ => {
                    if let Some((run_start, u, s)) = current_run.take() {
                        if u || s {
                            decoration_runs.push((run_start, start_x + x_offset, u, s));
                        }
                    }
                    current_run = Some((start_x + x_offset, has_deco.0, has_deco.1));
                }
            }
        }
        if let Some((run_start, u, s)) = current_run.take() {
            if u || s {
                decoration_runs.push((run_start, pen_x + x_offset, u, s));
            }
        }

        for (start_x, end_x, underline, strike) in decoration_runs {
            if underline {
                let y = baseline_y + base_face.metrics.units_per_em * 0.08 * mm_per_unit;
                collection.push(Path::from_points(vec![
                    Point::new(start_x, y),
                    Point::new(end_x, y),
                ]));
            }
            if strike {
                let y = baseline_y - base_face.metrics.x_height * 0.5 * mm_per_unit;
                collection.push(Path::from_points(vec![
                    Point::new(start_x, y),
                    Point::new(end_x, y),
                ]));
            }
        }

        line_metrics.push(LineMetrics {
            byte_start: line.byte_start,
            byte_len: line
                .slot_indices
                .last()
                .map(|&idx| slots[idx].byte_offset + 1 - line.byte_start)
                .unwrap_or(0),
            width_mm: line.width,
            x_offset_mm: x_offset,
            baseline_y_mm: baseline_y,
            hyphenated: line.hyphenated,
        });

        if i + 1 < lines_wip.len() {
            baseline_y += line_height_mm;
        }
    }

    let bbox = collection.bbox();
    Ok(TextLayout {
        paths: collection,
        bbox,
        lines: line_metrics,
        stats,
    })
}

fn tokenize(text: &str, slots: &[Slot]) -> VecDeque<Token> {
    let mut byte_to_slot = std::collections::HashMap::new();
    for (i, slot) in slots.iter().enumerate() {
        byte_to_slot.insert(slot.byte_offset, i);
    }
    let mut tokens = VecDeque::new();
    for (byte_start, word) in text.split_word_bound_indices() {
        let is_whitespace = word.chars().all(|c| c.is_whitespace());
        let slot_start = byte_to_slot[&byte_start];
        let slot_end = slot_start + word.chars().count();
        tokens.push_back(Token {
            slot_start,
            slot_end,
            is_whitespace,
            byte_start,
        });
    }
    tokens
}

fn pack_lines(
    mut queue: VecDeque<Token>,
    slots: &[Slot],
    options: &LayoutOptions,
    hyphen_advance_mm: f64,
) -> (Vec<LineWip>, usize) {
    let frame = options.frame_width_mm;
    let mut lines = Vec::new();
    let mut current = LineWip::new(0);
    let mut missing_breaks = 0usize;

    while let Some(tok) = queue.pop_front() {
        let tok_width: f64 = slots[tok.slot_start..tok.slot_end].iter().map(|s| s.advance_mm).sum();

        if tok.is_whitespace {
            if current.width + tok_width <= frame {
                current.push_range(tok.slot_start..tok.slot_end, tok_width);
            } else if !current.slot_indices.is_empty() {
                lines.push(std::mem::replace(&mut current, LineWip::new(next_byte_start(&queue, tok.byte_start))));
            }
            continue;
        }

        if current.width + tok_width <= frame {
            current.push_range(tok.slot_start..tok.slot_end, tok_width);
            continue;
        }

        if !current.slot_indices.is_empty() {
            lines.push(std::mem::replace(&mut current, LineWip::new(tok.byte_start)));
        }

        if tok_width <= frame {
            current.push_range(tok.slot_start..tok.slot_end, tok_width);
            continue;
        }

        // The word alone overflows an empty line.
        if options.hyphenate || options.break_long_words {
            let extra = if options.hyphenate { hyphen_advance_mm } else { 0.0 };
            let mut acc = 0.0;
            let mut split_at = tok.slot_start;
            for idx in tok.slot_start..tok.slot_end {
                let next_acc = acc + slots[idx].advance_mm;
                if next_acc + extra > frame && split_at > tok.slot_start {
                    break;
                }
                acc = next_acc;
                split_at = idx + 1;
            }
            if split_at == tok.slot_start {
                split_at = tok.slot_start + 1; // always make progress
            }
            let prefix_width: f64 = slots[tok.slot_start..split_at].iter().map(|s| s.advance_mm).sum();
            current.push_range(tok.slot_start..split_at, prefix_width + extra);
            current.hyphenated = options.hyphenate;
            lines.push(std::mem::replace(&mut current, LineWip::new(slots[split_at.min(slots.len() - 1)].byte_offset)));
            if split_at < tok.slot_end {
                queue.push_front(Token {
                    slot_start: split_at,
                    slot_end: tok.slot_end,
                    is_whitespace: false,
                    byte_start: slots[split_at].byte_offset,
                });
            }
        } else {
            current.push_range(tok.slot_start..tok.slot_end, tok_width);
            missing_breaks += 1;
            let next_start = next_byte_start(&queue, tok.byte_start);
            lines.push(std::mem::replace(&mut current, LineWip::new(next_start)));
        }
    }
    if !current.slot_indices.is_empty() {
        lines.push(current);
    }
    (lines, missing_breaks)
}

fn next_byte_start(queue: &VecDeque<Token>, fallback: usize) -> usize {
    queue.front().map(|t| t.byte_start).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_fonts::{FaceId, FaceMetrics, FontFace, Glyph};

    fn test_registry() -> FontRegistry {
        let metrics = FaceMetrics::default_for_units_per_em(1000.0);
        let glyphs: Vec<Glyph> = "Hello world!".chars().chain([' ']).map(|c| Glyph::new(c as u32, 500.0, vec![vec![(0.0, 0.0), (400.0, 700.0)]])).collect();
        let face = FontFace::new("default-sans", "Default Sans", "test", core_fonts::Style::REGULAR, metrics, glyphs);
        FontRegistry::from_faces(vec![face])
    }

    #[test]
    fn single_short_line_has_one_line_metrics() {
        let registry = test_registry();
        let options = LayoutOptions {
            frame_width_mm: 200.0,
            ..Default::default()
        };
        let layout = layout_text("Hello", &[], &options, &registry).unwrap();
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.stats.missing_glyphs, 0);
        assert!(layout.bbox.unwrap().width() < 200.0 - 20.0);
    }

    #[test]
    fn narrow_frame_wraps_into_multiple_lines() {
        let registry = test_registry();
        let options = LayoutOptions {
            frame_width_mm: 5.0,
            ..Default::default()
        };
        let layout = layout_text("Hello world", &[], &options, &registry).unwrap();
        assert!(layout.lines.len() > 1);
    }

    #[test]
    fn missing_glyph_is_counted_not_an_error() {
        let registry = test_registry();
        let options = LayoutOptions {
            frame_width_mm: 200.0,
            ..Default::default()
        };
        let layout = layout_text("H\u{1F600}", &[], &options, &registry).unwrap();
        assert_eq!(layout.stats.missing_glyphs, 1);
    }

    #[test]
    fn zero_frame_width_is_argument_error() {
        let registry = test_registry();
        let options = LayoutOptions {
            frame_width_mm: 0.0,
            ..Default::default()
        };
        let err = layout_text("Hello", &[], &options, &registry).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
