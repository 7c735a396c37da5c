use crate::point::Point;
use crate::units::Unit;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox<U: Unit> {
    pub min: Point<U>,
    pub max: Point<U>,
}

impl<U: Unit> BBox<U> {
    pub fn new(min: Point<U>, max: Point<U>) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point<U>]) -> Option<Self> {
        let mut iter = points.iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn convert<V: Unit>(&self) -> BBox<V> {
        BBox::new(self.min.convert::<V>(), self.max.convert::<V>())
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.min.translate(dx, dy), self.max.translate(dx, dy))
    }
}
