use core_fonts::{FaceId, FontRegistry, Style};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Resolved {
    pub face_id: FaceId,
    /// Set when the found face's style doesn't exactly match what was
    /// requested; the caller synthesizes the missing weight/slant.
    pub synthesize_bold: bool,
    pub synthesize_italic: bool,
}

/// Resolves a (codepoint, style) pair to a face, preferring the base
/// family and falling back to any other family that covers the
/// codepoint. Results are cached since the same pair recurs often
/// within a single layout pass.
pub struct FaceResolver<'a> {
    registry: &'a FontRegistry,
    base_family_key: String,
    cache: HashMap<(u32, bool, bool), Option<Resolved>>,
}

impl<'a> FaceResolver<'a> {
    pub fn new(registry: &'a FontRegistry, base_family_key: &str) -> Self {
        Self {
            registry,
            base_family_key: base_family_key.to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, codepoint: u32, requested: Style) -> Option<Resolved> {
        let key = (codepoint, requested.bold, requested.italic);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }
        let result = self.resolve_uncached(codepoint, requested);
        self.cache.insert(key, result.clone());
        result
    }

    fn resolve_uncached(&self, codepoint: u32, requested: Style) -> Option<Resolved> {
        let style_preference = [
            requested,
            Style {
                bold: requested.bold,
                italic: false,
            },
            Style {
                bold: false,
                italic: requested.italic,
            },
            Style::REGULAR,
        ];

        if let Some(family) = self.registry.family(&self.base_family_key) {
            for pref in style_preference {
                for id in &family.variants {
                    if let Some(face) = self.registry.face(id) {
                        if face.style == pref && face.covers(codepoint) {
                            return Some(Resolved {
                                face_id: face.id.clone(),
                                synthesize_bold: requested.bold && !face.style.bold,
                                synthesize_italic: requested.italic && !face.style.italic,
                            });
                        }
                    }
                }
            }
            // Any variant in the base family, regardless of style, beats
            // leaving the family entirely.
            for id in &family.variants {
                if let Some(face) = self.registry.face(id) {
                    if face.covers(codepoint) {
                        return Some(Resolved {
                            face_id: face.id.clone(),
                            synthesize_bold: requested.bold && !face.style.bold,
                            synthesize_italic: requested.italic && !face.style.italic,
                        });
                    }
                }
            }
        }

        for family in self.registry.families() {
            if family.key == self.base_family_key {
                continue;
            }
            for pref in style_preference {
                for id in &family.variants {
                    if let Some(face) = self.registry.face(id) {
                        if face.style == pref && face.covers(codepoint) {
                            return Some(Resolved {
                                face_id: face.id.clone(),
                                synthesize_bold: requested.bold && !face.style.bold,
                                synthesize_italic: requested.italic && !face.style.italic,
                            });
                        }
                    }
                }
            }
        }

        None
    }
}
