use core_canvas::CanvasLayout;
use core_error::Result;
use std::fmt::Write as _;

use crate::PreviewEmitter;

/// Plain string/XML building, no templating crate: the document is a
/// handful of polylines, not worth pulling in an XML writer for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgEmitter {
    pub stroke_width_mm: f64,
}

impl SvgEmitter {
    pub fn new(stroke_width_mm: f64) -> Self {
        Self { stroke_width_mm }
    }
}

impl PreviewEmitter for SvgEmitter {
    fn emit(&self, layout: &CanvasLayout) -> Result<Vec<u8>> {
        let stroke = if self.stroke_width_mm > 0.0 {
            self.stroke_width_mm
        } else {
            0.2
        };
        let (w, h) = (layout.frame_width_mm, layout.frame_height_mm);
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">
"#
        );
        for path in &layout.paths.paths {
            if path.points.len() < 2 {
                continue;
            }
            let _ = write!(out, r#"<polyline fill="none" stroke="black" stroke-width="{stroke}" points=""#);
            for p in &path.points {
                let _ = write!(out, "{:.4},{:.4} ", p.x, p.y);
            }
            out.push_str("\" />\n");
        }
        out.push_str("</svg>\n");
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_canvas::CanvasLayout;
    use core_geom::{Path, PathCollection, Point};

    #[test]
    fn emits_well_formed_svg_wrapper() {
        let paths = PathCollection::from_paths(vec![Path::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
        ])]);
        let layout = CanvasLayout {
            paths,
            bbox: None,
            frame_width_mm: 190.0,
            frame_height_mm: 277.0,
            scale_applied: 1.0,
        };
        let bytes = SvgEmitter::default().emit(&layout).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<polyline"));
        assert!(text.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn single_point_paths_are_skipped() {
        let paths = PathCollection::from_paths(vec![Path::from_points(vec![Point::new(1.0, 1.0)])]);
        let layout = CanvasLayout {
            paths,
            bbox: None,
            frame_width_mm: 100.0,
            frame_height_mm: 100.0,
            scale_applied: 1.0,
        };
        let text = String::from_utf8(SvgEmitter::default().emit(&layout).unwrap()).unwrap();
        assert!(!text.contains("<polyline"));
    }
}
