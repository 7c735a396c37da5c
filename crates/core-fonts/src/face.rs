use crate::glyph::{FaceMetrics, Glyph};
use crate::style::Style;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub String);

impl std::fmt::Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FaceId {
    fn from(s: &str) -> Self {
        FaceId(s.to_string())
    }
}

/// A loaded font face: its glyphs, metrics, and style classification.
#[derive(Debug, Clone)]
pub struct FontFace {
    pub id: FaceId,
    pub display_name: String,
    pub source: String,
    pub style: Style,
    pub metrics: FaceMetrics,
    glyphs: HashMap<u32, Glyph>,
    coverage: BTreeSet<u32>,
}

impl FontFace {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        source: impl Into<String>,
        style: Style,
        metrics: FaceMetrics,
        glyphs: Vec<Glyph>,
    ) -> Self {
        let coverage = glyphs.iter().map(|g| g.codepoint).collect();
        let glyphs = glyphs.into_iter().map(|g| (g.codepoint, g)).collect();
        Self {
            id: FaceId(id.into()),
            display_name: display_name.into(),
            source: source.into(),
            style,
            metrics,
            glyphs,
            coverage,
        }
    }

    pub fn covers(&self, codepoint: u32) -> bool {
        self.coverage.contains(&codepoint)
    }

    pub fn coverage(&self) -> &BTreeSet<u32> {
        &self.coverage
    }

    pub fn glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.glyphs.get(&codepoint)
    }

    /// Count of `required` codepoints this face can render.
    pub fn coverage_count(&self, required: &BTreeSet<u32>) -> usize {
        required.iter().filter(|cp| self.coverage.contains(cp)).count()
    }
}
