//! Render sinks: a composed canvas layout goes in, an owned byte buffer
//! comes out. Emitters never own the page beyond the call; callers write
//! and drop the returned bytes.

mod png;
mod svg;

use core_canvas::CanvasLayout;
use core_error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFormat {
    Svg,
    Png,
}

/// A render sink that turns page geometry into bytes. Implementations are
/// reentrant: no state survives a call.
pub trait PreviewEmitter {
    fn emit(&self, layout: &CanvasLayout) -> Result<Vec<u8>>;
}

pub use png::PngEmitter;
pub use svg::SvgEmitter;

pub fn emitter_for(format: PreviewFormat) -> Box<dyn PreviewEmitter> {
    match format {
        PreviewFormat::Svg => Box::new(SvgEmitter::default()),
        PreviewFormat::Png => Box::new(PngEmitter::default()),
    }
}
