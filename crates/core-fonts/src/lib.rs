//! Font registry: enumerate stroked faces, group them into families, and
//! resolve a face for a set of required codepoints.

mod catalog;
mod face;
mod glyph;
mod registry;
mod select;
mod style;

pub use catalog::{load_catalog, CatalogEntry};
pub use face::{FaceId, FontFace};
pub use glyph::{FaceMetrics, Glyph};
pub use registry::{FontFamily, FontRegistry};
pub use select::SelectionOutcome;
pub use style::Style;

/// Stable id of the built-in face used when nothing else resolves.
pub const DEFAULT_FACE_ID: &str = "default-sans";
