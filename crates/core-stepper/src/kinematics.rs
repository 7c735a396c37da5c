#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kinematics {
    Cartesian,
    CoreXY,
}

impl Kinematics {
    /// Project an (x, y) mm delta through this kinematic model into motor
    /// A/B deltas, still in mm (caller scales by steps_per_mm).
    pub fn project(&self, dx: f64, dy: f64) -> (f64, f64) {
        match self {
            Kinematics::Cartesian => (dx, dy),
            Kinematics::CoreXY => (dx + dy, dx - dy),
        }
    }
}
