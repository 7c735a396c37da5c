//! A strict-subset Markdown renderer: blocks and inline spans are parsed
//! by hand (no CommonMark compliance is attempted — see spec Non-goals)
//! and turned into page-local geometry via `core_text`.

mod block;
mod inline;
mod options;
mod render;

pub use block::{Alignment as TableAlignment, Block};
pub use inline::parse_inline;
pub use options::MarkdownOptions;
pub use render::{render_markdown, MarkdownLayout};
