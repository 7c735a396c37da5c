use core_geom::{Mm, Point};

#[derive(Debug, Clone, Copy)]
pub struct PlanSegment {
    pub target: Point<Mm>,
    pub feed_mm_s: f64,
    pub pen_down: bool,
}

impl PlanSegment {
    pub fn new(target: Point<Mm>, feed_mm_s: f64, pen_down: bool) -> Self {
        Self {
            target,
            feed_mm_s,
            pen_down,
        }
    }
}
