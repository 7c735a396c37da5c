use crate::bbox::BBox;
use crate::point::Point;
use crate::units::Unit;

/// An ordered polyline. No curves; every segment is a straight line
/// between consecutive points.
#[derive(Debug, Clone, Default)]
pub struct Path<U: Unit> {
    pub points: Vec<Point<U>>,
}

impl<U: Unit> Path<U> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point<U>>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, p: Point<U>) {
        self.points.push(p);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn bbox(&self) -> Option<BBox<U>> {
        BBox::from_points(&self.points)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::from_points(self.points.iter().map(|p| p.translate(dx, dy)).collect())
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::from_points(self.points.iter().map(|p| p.scale(factor)).collect())
    }

    pub fn rotate_about(&self, c: &Point<U>, theta_rad: f64) -> Self {
        Self::from_points(
            self.points
                .iter()
                .map(|p| p.rotate_about(c, theta_rad))
                .collect(),
        )
    }

    pub fn convert<V: Unit>(&self) -> Path<V> {
        Path::from_points(self.points.iter().map(|p| p.convert::<V>()).collect())
    }
}

/// A set of paths sharing a unit. The unit is carried in the type, so a
/// collection can never silently mix millimeters and inches.
#[derive(Debug, Clone, Default)]
pub struct PathCollection<U: Unit> {
    pub paths: Vec<Path<U>>,
}

impl<U: Unit> PathCollection<U> {
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }

    pub fn from_paths(paths: Vec<Path<U>>) -> Self {
        Self { paths }
    }

    pub fn push(&mut self, path: Path<U>) {
        if !path.is_empty() {
            self.paths.push(path);
        }
    }

    pub fn extend(&mut self, other: PathCollection<U>) {
        self.paths.extend(other.paths);
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.is_empty())
    }

    pub fn bbox(&self) -> Option<BBox<U>> {
        self.paths
            .iter()
            .filter_map(|p| p.bbox())
            .reduce(|a, b| a.union(&b))
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::from_paths(self.paths.iter().map(|p| p.translate(dx, dy)).collect())
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::from_paths(self.paths.iter().map(|p| p.scale(factor)).collect())
    }

    pub fn rotate_about(&self, c: &Point<U>, theta_rad: f64) -> Self {
        Self::from_paths(
            self.paths
                .iter()
                .map(|p| p.rotate_about(c, theta_rad))
                .collect(),
        )
    }

    /// Convert every point into a different unit. Physical position is
    /// preserved; only the numeric representation changes.
    pub fn convert<V: Unit>(&self) -> PathCollection<V> {
        PathCollection::from_paths(self.paths.iter().map(|p| p.convert::<V>()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Inch, Mm};

    fn sample() -> PathCollection<Mm> {
        PathCollection::from_paths(vec![Path::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ])])
    }

    #[test]
    fn convert_round_trip_is_point_wise_identity() {
        let original = sample();
        let back: PathCollection<Mm> = original.convert::<Inch>().convert::<Mm>();
        for (a, b) in original.paths[0].points.iter().zip(back.paths[0].points.iter()) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn translate_rotate_commute_with_rotate_about() {
        let original = sample();
        let c = Point::<Mm>::new(5.0, 5.0);
        let theta = 0.3;
        let via_rotate_about = original.rotate_about(&c, theta);
        let manual = original
            .translate(-c.x, -c.y)
            .rotate_about(&Point::origin(), theta)
            .translate(c.x, c.y);
        for (a, b) in via_rotate_about.paths[0]
            .points
            .iter()
            .zip(manual.paths[0].points.iter())
        {
            assert_eq!(a, b);
        }
    }
}
