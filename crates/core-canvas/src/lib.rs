//! Page composition: paper size, margins, orientation, and fit-to-frame
//! scaling on top of a rendered text or Markdown layout.

mod page;
mod compose;

pub use compose::{compose_markdown, compose_text, CanvasLayout};
pub use page::{Orientation, PageOptions};
