use crate::face::{FaceId, FontFace};
use crate::DEFAULT_FACE_ID;
use core_error::{PlotError, Result};
use std::collections::BTreeMap;

/// A family view derived from the faces that share a normalized key. Not
/// stored directly — computed from the registry's faces so there is one
/// source of truth.
#[derive(Debug, Clone)]
pub struct FontFamily {
    pub key: String,
    pub display_name: String,
    pub variants: Vec<FaceId>,
}

#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    faces: BTreeMap<FaceId, FontFace>,
    insertion_order: Vec<FaceId>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_faces(faces: Vec<FontFace>) -> Self {
        let mut registry = Self::new();
        for face in faces {
            registry.insert(face);
        }
        registry
    }

    pub fn insert(&mut self, face: FontFace) {
        self.insertion_order.push(face.id.clone());
        self.faces.insert(face.id.clone(), face);
    }

    pub fn face(&self, id: &FaceId) -> Option<&FontFace> {
        self.faces.get(id)
    }

    pub fn faces(&self) -> impl Iterator<Item = &FontFace> {
        self.insertion_order.iter().filter_map(move |id| self.faces.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Families grouped by normalized key, in first-seen order, each
    /// variant listed in the order its face was inserted.
    pub fn families(&self) -> Vec<FontFamily> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<String, FontFamily> = BTreeMap::new();
        for id in &self.insertion_order {
            let Some(face) = self.faces.get(id) else { continue };
            let key = normalize_family_key(&face.display_name);
            let entry = grouped.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                FontFamily {
                    key: key.clone(),
                    display_name: family_display_name(&face.display_name),
                    variants: Vec::new(),
                }
            });
            entry.variants.push(face.id.clone());
        }
        order.into_iter().filter_map(|k| grouped.remove(&k)).collect()
    }

    pub fn family(&self, key: &str) -> Option<FontFamily> {
        self.families().into_iter().find(|f| f.key == key)
    }

    pub fn default_face_id(&self) -> Result<FaceId> {
        let default = FaceId(DEFAULT_FACE_ID.to_string());
        if self.faces.contains_key(&default) {
            return Ok(default);
        }
        self.insertion_order
            .first()
            .cloned()
            .ok_or_else(|| PlotError::resource("font catalog is empty"))
    }

    /// Resolve a face by exact id or case-insensitive substring of its
    /// display name. An empty or unmatched query falls back to the
    /// default face.
    pub fn resolve(&self, query: &str) -> Result<FaceId> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.default_face_id();
        }
        if let Some(face) = self.faces.get(&FaceId(trimmed.to_string())) {
            return Ok(face.id.clone());
        }
        let needle = trimmed.to_lowercase();
        for id in &self.insertion_order {
            if let Some(face) = self.faces.get(id) {
                if face.display_name.to_lowercase().contains(&needle) {
                    return Ok(face.id.clone());
                }
            }
        }
        self.default_face_id()
    }
}

/// Strip a trailing style suffix (Bold, Italic, Bold Italic, Regular) to
/// get the family's normalized key.
pub(crate) fn normalize_family_key(display_name: &str) -> String {
    family_display_name(display_name).to_lowercase()
}

fn family_display_name(display_name: &str) -> String {
    const SUFFIXES: &[&str] = &["bold italic", "bolditalic", "bold", "italic", "regular"];
    let mut name = display_name.trim().to_string();
    loop {
        let lower = name.to_lowercase();
        let mut stripped = None;
        for suffix in SUFFIXES {
            if lower.ends_with(suffix) {
                let cut = name.len() - suffix.len();
                let candidate = name[..cut].trim_end().to_string();
                if !candidate.is_empty() {
                    stripped = Some(candidate);
                }
                break;
            }
        }
        match stripped {
            Some(next) if next != name => name = next,
            _ => break,
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::FaceMetrics;
    use crate::style::Style;

    fn face(id: &str, name: &str, style: Style) -> FontFace {
        FontFace::new(id, name, "test", style, FaceMetrics::default_for_units_per_em(1000.0), vec![])
    }

    #[test]
    fn families_group_by_stripped_style_suffix() {
        let registry = FontRegistry::from_faces(vec![
            face("sans-r", "Sans Regular", Style::REGULAR),
            face("sans-b", "Sans Bold", Style::BOLD),
            face("sans-i", "Sans Italic", Style::ITALIC),
        ]);
        let families = registry.families();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].display_name, "Sans");
        assert_eq!(families[0].variants.len(), 3);
    }

    #[test]
    fn resolve_empty_query_returns_default_or_first() {
        let registry = FontRegistry::from_faces(vec![face("only", "Only Face", Style::REGULAR)]);
        assert_eq!(registry.resolve("").unwrap(), FaceId("only".into()));
    }

    #[test]
    fn resolve_exact_id_wins_over_substring() {
        let registry = FontRegistry::from_faces(vec![
            face("serif-r", "Serif Regular", Style::REGULAR),
            face("sans-r", "Sans Regular", Style::REGULAR),
        ]);
        assert_eq!(registry.resolve("serif-r").unwrap(), FaceId("serif-r".into()));
    }

    #[test]
    fn resolve_unmatched_falls_back_to_default() {
        let registry = FontRegistry::from_faces(vec![face(
            crate::DEFAULT_FACE_ID,
            "Default Sans",
            Style::REGULAR,
        )]);
        assert_eq!(
            registry.resolve("nonexistent").unwrap(),
            FaceId(crate::DEFAULT_FACE_ID.into())
        );
    }
}
