use crate::path::PathCollection;
use crate::units::Unit;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash a path collection by quantizing every coordinate to whole
/// micrometers (after converting to millimeters). Two collections that
/// differ only by sub-micrometer floating point noise hash equal.
pub fn quantized_hash<U: Unit>(collection: &PathCollection<U>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for path in &collection.paths {
        0xA5u8.hash(&mut hasher); // path separator
        for p in &path.points {
            let mm_x = U::to_mm(p.x);
            let mm_y = U::to_mm(p.y);
            quantize_um(mm_x).hash(&mut hasher);
            quantize_um(mm_y).hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn quantize_um(mm: f64) -> i64 {
    (mm * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::point::Point;
    use crate::units::{Inch, Mm};

    #[test]
    fn sub_micrometer_noise_hashes_equal() {
        let a = PathCollection::from_paths(vec![Path::from_points(vec![Point::<Mm>::new(
            1.000_000_1,
            2.0,
        )])]);
        let b = PathCollection::from_paths(vec![Path::from_points(vec![Point::<Mm>::new(
            1.000_000_2,
            2.0,
        )])]);
        assert_eq!(quantized_hash(&a), quantized_hash(&b));
    }

    #[test]
    fn hash_is_unit_invariant() {
        let mm = PathCollection::from_paths(vec![Path::from_points(vec![Point::<Mm>::new(
            25.4, 50.8,
        )])]);
        let inch: PathCollection<Inch> = mm.convert();
        assert_eq!(quantized_hash(&mm), quantized_hash(&inch));
    }
}
