use crate::units::Unit;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

/// A 2D point tagged with its unit. The tag is zero-sized; `Point<Mm>` and
/// `Point<Inch>` have identical layout but cannot be confused at compile
/// time.
#[derive(Debug, Clone, Copy)]
pub struct Point<U: Unit> {
    pub x: f64,
    pub y: f64,
    _unit: PhantomData<U>,
}

impl<U: Unit> Point<U> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _unit: PhantomData,
        }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Convert this point into a different unit, preserving physical position.
    pub fn convert<V: Unit>(&self) -> Point<V> {
        let mm_x = U::to_mm(self.x);
        let mm_y = U::to_mm(self.y);
        Point::new(V::from_mm(mm_x), V::from_mm(mm_y))
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Rotate by `theta_rad` radians about the origin.
    pub fn rotate(&self, theta_rad: f64) -> Self {
        let (sin, cos) = theta_rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotate by `theta_rad` about an arbitrary center `c`.
    pub fn rotate_about(&self, c: &Self, theta_rad: f64) -> Self {
        self.translate(-c.x, -c.y).rotate(theta_rad).translate(c.x, c.y)
    }
}

impl<U: Unit> Add for Point<U> {
    type Output = Point<U>;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<U: Unit> Sub for Point<U> {
    type Output = Point<U>;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<U: Unit> PartialEq for Point<U> {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < 1e-9 && (self.y - other.y).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Inch, Mm};

    #[test]
    fn convert_round_trips() {
        let p = Point::<Mm>::new(12.34, -5.6);
        let back: Point<Mm> = p.convert::<Inch>().convert::<Mm>();
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn rotate_about_matches_translate_rotate_translate() {
        let p = Point::<Mm>::new(3.0, 4.0);
        let c = Point::<Mm>::new(1.0, 1.0);
        let theta = 0.7_f64;
        let via_helper = p.rotate_about(&c, theta);
        let manual = p.translate(-c.x, -c.y).rotate(theta).translate(c.x, c.y);
        assert_eq!(via_helper, manual);
    }
}
