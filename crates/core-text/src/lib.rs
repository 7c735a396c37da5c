//! Text layout: shape UTF-8 into glyph polylines, break lines, align, and
//! decorate spans with underline/strike.

mod engine;
mod resolver;
mod types;

pub use engine::layout_text;
pub use types::{Alignment, InlineSpan, LineMetrics, RenderStats, SpanStyle, TextLayout, LayoutOptions};
