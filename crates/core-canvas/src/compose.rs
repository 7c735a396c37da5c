use core_error::{PlotError, Result};
use core_fonts::FontRegistry;
use core_geom::{BBox, Mm, PathCollection};
use core_markdown::{render_markdown, MarkdownLayout, MarkdownOptions};
use core_text::{layout_text, InlineSpan, LayoutOptions, TextLayout};
use tracing::debug;

use crate::page::PageOptions;

/// A fully composed page: content translated into page coordinates, its
/// bounding box, and the frame it was fit within.
#[derive(Debug, Clone)]
pub struct CanvasLayout {
    pub paths: PathCollection<Mm>,
    pub bbox: Option<BBox<Mm>>,
    pub frame_width_mm: f64,
    pub frame_height_mm: f64,
    pub scale_applied: f64,
}

const FIT_MARGIN: f64 = 0.985;

fn validate_frame(page: &PageOptions) -> Result<(f64, f64)> {
    if !page.margins_valid() {
        return Err(PlotError::invalid_input("margins must be non-negative"));
    }
    let (frame_w, frame_h) = page.frame_size();
    if frame_w <= 0.0 || frame_h <= 0.0 {
        return Err(PlotError::invalid_input(
            "effective printable area is non-positive",
        ));
    }
    Ok((frame_w, frame_h))
}

fn place(layout: TextLayout, page: &PageOptions, frame_w: f64, frame_h: f64, scale: f64) -> CanvasLayout {
    let (x0, y0) = match layout.bbox {
        Some(b) => (b.min.x, b.min.y),
        None => (0.0, 0.0),
    };
    let dx = page.margin_left_mm - x0;
    let dy = page.margin_top_mm - y0;
    let translated = layout.paths.translate(dx, dy);
    let bbox = layout.bbox.map(|b| b.translate(dx, dy));
    CanvasLayout {
        paths: translated,
        bbox,
        frame_width_mm: frame_w,
        frame_height_mm: frame_h,
        scale_applied: scale,
    }
}

fn fit_scale(bbox: &BBox<Mm>, frame_w: f64, frame_h: f64) -> Option<f64> {
    let w = bbox.width();
    let h = bbox.height();
    if w > frame_w || h > frame_h {
        let s = (frame_w / w).min(frame_h / h) * FIT_MARGIN;
        Some(s)
    } else {
        None
    }
}

/// Compose a plain-text layout onto a page, applying fit-to-frame scaling
/// by re-invoking the text renderer at a reduced point size if needed.
pub fn compose_text(
    text: &str,
    spans: &[InlineSpan],
    options: &LayoutOptions,
    page: &PageOptions,
    registry: &FontRegistry,
) -> Result<CanvasLayout> {
    let (frame_w, frame_h) = validate_frame(page)?;

    let mut opts = options.clone();
    opts.frame_width_mm = frame_w;
    let layout = layout_text(text, spans, &opts, registry)?;

    if page.fit_to_frame {
        if let Some(bbox) = layout.bbox {
            if let Some(scale) = fit_scale(&bbox, frame_w, frame_h) {
                debug!(target: "core_canvas::compose", scale, "re-rendering to fit frame");
                opts.point_size_pt *= scale;
                let rescaled = layout_text(text, spans, &opts, registry)?;
                return Ok(place(rescaled, page, frame_w, frame_h, scale));
            }
        }
        Ok(place(layout, page, frame_w, frame_h, 1.0))
    } else {
        Ok(place(layout, page, frame_w, frame_h, 1.0))
    }
}

/// Compose a Markdown document onto a page, applying fit-to-frame scaling
/// to both body and heading point sizes proportionally if needed.
pub fn compose_markdown(
    source: &str,
    options: &MarkdownOptions,
    page: &PageOptions,
    registry: &FontRegistry,
) -> Result<CanvasLayout> {
    let (frame_w, frame_h) = validate_frame(page)?;

    let mut opts = options.clone();
    opts.frame_width_mm = frame_w;
    let layout = render_markdown(source, &opts, registry)?;

    if page.fit_to_frame {
        if let Some(bbox) = layout.bbox {
            if let Some(scale) = fit_scale(&bbox, frame_w, frame_h) {
                debug!(target: "core_canvas::compose", scale, "re-rendering markdown to fit frame");
                opts.base_pt *= scale;
                for pt in &mut opts.heading_pts {
                    *pt *= scale;
                }
                let rescaled = render_markdown(source, &opts, registry)?;
                return Ok(place_markdown(rescaled, page, frame_w, frame_h, scale));
            }
        }
        Ok(place_markdown(layout, page, frame_w, frame_h, 1.0))
    } else {
        Ok(place_markdown(layout, page, frame_w, frame_h, 1.0))
    }
}

fn place_markdown(
    layout: MarkdownLayout,
    page: &PageOptions,
    frame_w: f64,
    frame_h: f64,
    scale: f64,
) -> CanvasLayout {
    let (x0, y0) = match layout.bbox {
        Some(b) => (b.min.x, b.min.y),
        None => (0.0, 0.0),
    };
    let dx = page.margin_left_mm - x0;
    let dy = page.margin_top_mm - y0;
    let translated = layout.paths.translate(dx, dy);
    let bbox = layout.bbox.map(|b| b.translate(dx, dy));
    CanvasLayout {
        paths: translated,
        bbox,
        frame_width_mm: frame_w,
        frame_height_mm: frame_h,
        scale_applied: scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Orientation;
    use core_fonts::{FontFace, Glyph, Style};

    fn test_registry() -> FontRegistry {
        let glyphs: Vec<Glyph> = "Hello world, this is quite a long line of text indeed!"
            .chars()
            .chain(" .,!".chars())
            .map(|c| Glyph::new(c as u32, 500.0, Vec::new()))
            .collect();
        let face = FontFace::new(
            "default-sans",
            "Default Sans",
            "test",
            Style::REGULAR,
            core_fonts::FaceMetrics::default_for_units_per_em(1000.0),
            glyphs,
        );
        FontRegistry::from_faces(vec![face])
    }

    fn page() -> PageOptions {
        PageOptions {
            paper_width_mm: 210.0,
            paper_height_mm: 297.0,
            margin_top_mm: 10.0,
            margin_right_mm: 10.0,
            margin_bottom_mm: 10.0,
            margin_left_mm: 10.0,
            orientation: Orientation::Portrait,
            fit_to_frame: true,
        }
    }

    #[test]
    fn negative_margin_is_invalid_input() {
        let mut p = page();
        p.margin_left_mm = -1.0;
        let registry = test_registry();
        let options = LayoutOptions::default();
        let err = compose_text("Hello", &[], &options, &p, &registry).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn content_is_translated_to_margin_origin() {
        let registry = test_registry();
        let page = page();
        let options = LayoutOptions::default();
        let canvas = compose_text("Hello", &[], &options, &page, &registry).unwrap();
        let bbox = canvas.bbox.unwrap();
        assert!((bbox.min.x - page.margin_left_mm).abs() < 1e-6);
        assert!((bbox.min.y - page.margin_top_mm).abs() < 1e-6);
    }

    #[test]
    fn landscape_swaps_frame_dimensions() {
        let mut p = page();
        p.orientation = Orientation::Landscape;
        let (w, h) = p.frame_size();
        assert!(w > h);
    }
}
