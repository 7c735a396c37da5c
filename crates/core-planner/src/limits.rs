use core_error::{PlotError, Result};

#[derive(Debug, Clone, Copy)]
pub struct PlannerLimits {
    pub max_feed_mm_s: f64,
    pub max_accel_mm_s2: f64,
    pub max_cornering_mm: f64,
    pub min_segment_mm: f64,
    pub pen_up_feed_mm_s: f64,
}

impl PlannerLimits {
    pub fn validate(&self) -> Result<()> {
        if self.max_feed_mm_s <= 0.0 {
            return Err(PlotError::config("max feed must be positive"));
        }
        if self.max_accel_mm_s2 <= 0.0 {
            return Err(PlotError::config("max accel must be positive"));
        }
        if self.max_cornering_mm < 0.0 {
            return Err(PlotError::config("max cornering distance must be non-negative"));
        }
        if self.min_segment_mm < 0.0 {
            return Err(PlotError::config("min segment length must be non-negative"));
        }
        if self.pen_up_feed_mm_s <= 0.0 {
            return Err(PlotError::config("pen-up feed must be positive"));
        }
        Ok(())
    }
}
