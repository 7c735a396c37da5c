use crate::face::FaceId;
use crate::registry::{FontFamily, FontRegistry};
use core_error::Result;
use std::cmp::Reverse;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub face_id: FaceId,
    pub family_key: String,
    pub covers_all: bool,
}

/// Deterministic best-face selection for a set of required codepoints,
/// honoring a preferred family/face hint. See the family design doc for
/// the exact tie-break order; this function is a direct transcription.
pub fn select_face(
    registry: &FontRegistry,
    required: &BTreeSet<u32>,
    preferred_hint: Option<&str>,
) -> Result<SelectionOutcome> {
    if let Some(hint) = preferred_hint {
        if let Some(face) = registry.face(&FaceId(hint.to_string())) {
            let covers_all = required.iter().all(|cp| face.covers(*cp));
            return Ok(SelectionOutcome {
                face_id: face.id.clone(),
                family_key: crate::registry::normalize_family_key(&face.display_name),
                covers_all,
            });
        }
    }

    let families = registry.families();
    if families.is_empty() {
        let default = registry.default_face_id()?;
        return Ok(SelectionOutcome {
            face_id: default,
            family_key: String::new(),
            covers_all: false,
        });
    }

    let mut scored: Vec<FamilyScore> = families
        .iter()
        .filter_map(|family| FamilyScore::compute(registry, family, required))
        .collect();
    if scored.is_empty() {
        let default = registry.default_face_id()?;
        return Ok(SelectionOutcome {
            face_id: default,
            family_key: String::new(),
            covers_all: false,
        });
    }
    scored.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    let best = &scored[0];

    let preferred_key = preferred_hint.map(|h| h.trim().to_lowercase());
    let chosen = if let (Some(pref_key), true) = (
        preferred_key.as_deref(),
        scored.iter().any(|s| {
            preferred_key.as_deref() == Some(s.key.as_str()) && s.covers_all
        }),
    ) {
        let preferred = scored.iter().find(|s| s.key == pref_key).unwrap();
        if best.sort_key() < preferred.sort_key() {
            best
        } else {
            preferred
        }
    } else {
        best
    };

    Ok(SelectionOutcome {
        face_id: chosen.best_variant.clone(),
        family_key: chosen.key.clone(),
        covers_all: chosen.covers_all,
    })
}

struct FamilyScore {
    key: String,
    display_name: String,
    best_variant: FaceId,
    covers_all: bool,
    coverage_count: usize,
    capability_popcount: u8,
    has_regular: bool,
    has_bold: bool,
    has_italic: bool,
    best_style_priority: u8,
    variant_count: usize,
}

type SortKey = (
    Reverse<bool>,
    Reverse<usize>,
    Reverse<u8>,
    Reverse<bool>,
    Reverse<bool>,
    Reverse<bool>,
    u8,
    Reverse<usize>,
    String,
);

impl FamilyScore {
    fn compute(registry: &FontRegistry, family: &FontFamily, required: &BTreeSet<u32>) -> Option<Self> {
        let faces: Vec<_> = family
            .variants
            .iter()
            .filter_map(|id| registry.face(id))
            .collect();
        if faces.is_empty() {
            return None;
        }

        let mut styles = BTreeSet::new();
        let mut has_regular = false;
        let mut has_bold = false;
        let mut has_italic = false;
        for face in &faces {
            styles.insert((face.style.bold, face.style.italic));
            has_regular |= face.style.is_regular();
            has_bold |= face.style.bold;
            has_italic |= face.style.italic;
        }

        let best_face = faces
            .iter()
            .max_by(|a, b| {
                let ca = a.coverage_count(required);
                let cb = b.coverage_count(required);
                ca.cmp(&cb).then_with(|| b.style.priority().cmp(&a.style.priority()))
            })
            .copied()?;

        let coverage_count = best_face.coverage_count(required);
        let covers_all = !required.is_empty() && coverage_count == required.len();

        Some(Self {
            key: family.key.clone(),
            display_name: family.display_name.clone(),
            best_variant: best_face.id.clone(),
            covers_all,
            coverage_count,
            capability_popcount: styles.len() as u8,
            has_regular,
            has_bold,
            has_italic,
            best_style_priority: best_face.style.priority(),
            variant_count: faces.len(),
        })
    }

    fn sort_key(&self) -> SortKey {
        (
            Reverse(self.covers_all),
            Reverse(self.coverage_count),
            Reverse(self.capability_popcount),
            Reverse(self.has_regular),
            Reverse(self.has_bold),
            Reverse(self.has_italic),
            self.best_style_priority,
            Reverse(self.variant_count),
            self.display_name.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FontFace;
    use crate::glyph::{FaceMetrics, Glyph};
    use crate::style::Style;

    fn face_with(id: &str, name: &str, style: Style, codepoints: &[u32]) -> FontFace {
        let glyphs = codepoints.iter().map(|cp| Glyph::blank(*cp, 600.0)).collect();
        FontFace::new(id, name, "test", style, FaceMetrics::default_for_units_per_em(1000.0), glyphs)
    }

    #[test]
    fn exact_face_id_hint_wins_unconditionally() {
        let registry = FontRegistry::from_faces(vec![
            face_with("sans-r", "Sans Regular", Style::REGULAR, &[65]),
            face_with("serif-r", "Serif Regular", Style::REGULAR, &[65, 66]),
        ]);
        let required: BTreeSet<u32> = [65, 66].into_iter().collect();
        let outcome = select_face(&registry, &required, Some("sans-r")).unwrap();
        assert_eq!(outcome.face_id, FaceId("sans-r".into()));
    }

    #[test]
    fn full_coverage_family_wins_over_partial() {
        let registry = FontRegistry::from_faces(vec![
            face_with("sans-r", "Sans Regular", Style::REGULAR, &[65]),
            face_with("serif-r", "Serif Regular", Style::REGULAR, &[65, 66]),
        ]);
        let required: BTreeSet<u32> = [65, 66].into_iter().collect();
        let outcome = select_face(&registry, &required, None).unwrap();
        assert_eq!(outcome.family_key, "serif");
        assert!(outcome.covers_all);
    }

    #[test]
    fn preferred_family_wins_tie_against_equally_good_family() {
        let registry = FontRegistry::from_faces(vec![
            face_with("sans-r", "Sans Regular", Style::REGULAR, &[65, 66]),
            face_with("serif-r", "Serif Regular", Style::REGULAR, &[65, 66]),
        ]);
        let required: BTreeSet<u32> = [65, 66].into_iter().collect();
        let outcome = select_face(&registry, &required, Some("sans")).unwrap();
        assert_eq!(outcome.family_key, "sans");
    }

    #[test]
    fn selection_is_deterministic_across_runs() {
        let registry = FontRegistry::from_faces(vec![
            face_with("sans-r", "Sans Regular", Style::REGULAR, &[65]),
            face_with("sans-b", "Sans Bold", Style::BOLD, &[65]),
            face_with("serif-r", "Serif Regular", Style::REGULAR, &[65]),
        ]);
        let required: BTreeSet<u32> = [65].into_iter().collect();
        let first = select_face(&registry, &required, None).unwrap();
        let second = select_face(&registry, &required, None).unwrap();
        assert_eq!(first, second);
    }
}
