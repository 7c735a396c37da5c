//! Font catalog loading. The on-disk format is intentionally simple and
//! opaque to the rest of the pipeline: an index file maps stable ids to
//! face files, and each face file holds metrics plus glyph stroke data
//! keyed by codepoint. Nothing outside this module depends on the exact
//! container format.

use crate::face::FontFace;
use crate::glyph::{FaceMetrics, Glyph};
use crate::registry::FontRegistry;
use crate::style::Style;
use core_error::{PlotError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub style: CatalogStyle,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl From<CatalogStyle> for Style {
    fn from(s: CatalogStyle) -> Self {
        match s {
            CatalogStyle::Regular => Style::REGULAR,
            CatalogStyle::Bold => Style::BOLD,
            CatalogStyle::Italic => Style::ITALIC,
            CatalogStyle::BoldItalic => Style::BOLD_ITALIC,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(rename = "face", default)]
    faces: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct FaceFile {
    units_per_em: f64,
    ascent: f64,
    descent: f64,
    cap_height: f64,
    x_height: f64,
    #[serde(rename = "glyph", default)]
    glyphs: Vec<GlyphEntry>,
}

#[derive(Debug, Deserialize)]
struct GlyphEntry {
    codepoint: u32,
    advance: f64,
    #[serde(default)]
    strokes: Vec<Vec<(f64, f64)>>,
}

/// Load every face named in `<dir>/index.toml`, skipping (with a warning)
/// any entry whose face file fails to parse.
pub fn load_catalog(dir: &Path) -> Result<FontRegistry> {
    let index_path = dir.join("index.toml");
    let index_raw = std::fs::read_to_string(&index_path)
        .map_err(|e| PlotError::resource(format!("reading {}: {e}", index_path.display())))?;
    let index: IndexFile = toml::from_str(&index_raw)
        .map_err(|e| PlotError::resource(format!("parsing {}: {e}", index_path.display())))?;

    let mut registry = FontRegistry::new();
    for entry in index.faces {
        match load_face(dir, &entry) {
            Ok(face) => registry.insert(face),
            Err(e) => {
                tracing::warn!(target: "fonts", face_id = %entry.id, error = %e, "skipping unreadable face");
            }
        }
    }
    if registry.is_empty() {
        return Err(PlotError::resource("font catalog contained no loadable faces"));
    }
    Ok(registry)
}

fn load_face(dir: &Path, entry: &CatalogEntry) -> Result<FontFace> {
    let path: PathBuf = dir.join(&entry.path);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| PlotError::resource(format!("reading {}: {e}", path.display())))?;
    let file: FaceFile = toml::from_str(&raw)
        .map_err(|e| PlotError::resource(format!("parsing {}: {e}", path.display())))?;

    let metrics = FaceMetrics {
        units_per_em: file.units_per_em,
        ascent: file.ascent,
        descent: file.descent,
        cap_height: file.cap_height,
        x_height: file.x_height,
    };
    let glyphs = file
        .glyphs
        .into_iter()
        .map(|g| Glyph::new(g.codepoint, g.advance, g.strokes))
        .collect();

    Ok(FontFace::new(
        entry.id.clone(),
        entry.name.clone(),
        path.display().to_string(),
        entry.style.into(),
        metrics,
        glyphs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_index_and_face_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("index.toml"),
            r#"
            [[face]]
            id = "sans-r"
            name = "Sans Regular"
            path = "sans-r.toml"
            style = "regular"
            "#,
        )
        .unwrap();
        fs::write(
            dir.path().join("sans-r.toml"),
            r#"
            units_per_em = 1000
            ascent = 750
            descent = 250
            cap_height = 700
            x_height = 500

            [[glyph]]
            codepoint = 65
            advance = 600
            strokes = [[[0.0, 0.0], [10.0, 10.0]]]
            "#,
        )
        .unwrap();

        let registry = load_catalog(dir.path()).unwrap();
        let face = registry.face(&crate::FaceId("sans-r".into())).unwrap();
        assert!(face.covers(65));
        assert_eq!(face.metrics.units_per_em, 1000.0);
    }

    #[test]
    fn missing_index_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(dir.path()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
