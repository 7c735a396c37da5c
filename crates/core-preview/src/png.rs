use core_canvas::CanvasLayout;
use core_error::{PlotError, Result};
use image::{GrayImage, Luma};
use std::io::Cursor;

use crate::PreviewEmitter;

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Rasterizes strokes onto a monochrome bitmap at a fixed pixel density,
/// then encodes it as PNG via the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct PngEmitter {
    pub dots_per_mm: f64,
}

impl Default for PngEmitter {
    fn default() -> Self {
        Self { dots_per_mm: 300.0 / 25.4 }
    }
}

impl PngEmitter {
    pub fn new(dots_per_mm: f64) -> Self {
        Self { dots_per_mm }
    }
}

impl PreviewEmitter for PngEmitter {
    fn emit(&self, layout: &CanvasLayout) -> Result<Vec<u8>> {
        let width_px = (layout.frame_width_mm * self.dots_per_mm).ceil().max(1.0) as u32;
        let height_px = (layout.frame_height_mm * self.dots_per_mm).ceil().max(1.0) as u32;
        let mut image = GrayImage::from_pixel(width_px, height_px, WHITE);

        for path in &layout.paths.paths {
            for pair in path.points.windows(2) {
                draw_line(&mut image, &self.to_px(pair[0].x, pair[0].y), &self.to_px(pair[1].x, pair[1].y));
            }
        }

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| PlotError::internal(format!("png encode failed: {e}")))?;
        Ok(bytes)
    }
}

impl PngEmitter {
    fn to_px(&self, x_mm: f64, y_mm: f64) -> (i64, i64) {
        (
            (x_mm * self.dots_per_mm).round() as i64,
            (y_mm * self.dots_per_mm).round() as i64,
        )
    }
}

/// Bresenham's line algorithm, clipped to the image bounds.
fn draw_line(image: &mut GrayImage, a: &(i64, i64), b: &(i64, i64)) {
    let (mut x0, mut y0) = *a;
    let (x1, y1) = *b;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < image.width() && (y0 as u32) < image.height() {
            image.put_pixel(x0 as u32, y0 as u32, BLACK);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::{Path, PathCollection, Point};

    #[test]
    fn emits_a_valid_png_header() {
        let paths = PathCollection::from_paths(vec![Path::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
        ])]);
        let layout = CanvasLayout {
            paths,
            bbox: None,
            frame_width_mm: 10.0,
            frame_height_mm: 10.0,
            scale_applied: 1.0,
        };
        let bytes = PngEmitter::new(10.0).emit(&layout).unwrap();
        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn empty_layout_still_encodes() {
        let layout = CanvasLayout {
            paths: PathCollection::new(),
            bbox: None,
            frame_width_mm: 5.0,
            frame_height_mm: 5.0,
            scale_applied: 1.0,
        };
        let bytes = PngEmitter::default().emit(&layout).unwrap();
        assert!(!bytes.is_empty());
    }
}
