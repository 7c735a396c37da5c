//! A composed affine transform (translate + uniform scale + rotate), for
//! callers that want to batch several of [`crate::Path`]'s primitive ops
//! into a single pass over the points.

use crate::path::{Path, PathCollection};
use crate::point::Point;
use crate::units::Unit;

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
    pub theta_rad: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            scale: 1.0,
            theta_rad: 0.0,
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            scale: 1.0,
            theta_rad: 0.0,
        }
    }

    pub fn apply<U: Unit>(&self, p: &Point<U>) -> Point<U> {
        p.scale(self.scale).rotate(self.theta_rad).translate(self.dx, self.dy)
    }

    pub fn apply_path<U: Unit>(&self, path: &Path<U>) -> Path<U> {
        Path::from_points(path.points.iter().map(|p| self.apply(p)).collect())
    }

    pub fn apply_collection<U: Unit>(&self, coll: &PathCollection<U>) -> PathCollection<U> {
        PathCollection::from_paths(coll.paths.iter().map(|p| self.apply_path(p)).collect())
    }
}
