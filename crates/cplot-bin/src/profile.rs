use core_planner::PlannerLimits;
use core_stepper::{Kinematics, StepperSettings};

/// The hardware-fixed side of a device's motion characteristics: things
/// a `cplot.toml` does not override because they describe the physical
/// machine, not a user preference. `nominal_feed`/`nominal_accel` and the
/// servo fields still come from config; this is the "model profile"
/// layer the option-resolution order sits beneath.
#[derive(Debug, Clone, Copy)]
pub struct MotionProfile {
    pub steps_per_mm: f64,
    pub kinematics: Kinematics,
    pub max_feed_mm_s: f64,
    pub max_accel_mm_s2: f64,
    pub max_cornering_mm: f64,
    pub min_segment_mm: f64,
    pub pen_up_feed_mm_s: f64,
    pub servo_settle_ms: u32,
}

impl MotionProfile {
    /// The single built-in profile shipped today. A multi-model catalog
    /// is future work; the Cartesian/CoreXY choice varies per device
    /// variant and is resolved here as Cartesian.
    pub fn builtin() -> Self {
        Self {
            steps_per_mm: 80.0,
            kinematics: Kinematics::Cartesian,
            max_feed_mm_s: 120.0,
            max_accel_mm_s2: 600.0,
            max_cornering_mm: 0.1,
            min_segment_mm: 0.02,
            pen_up_feed_mm_s: 150.0,
            servo_settle_ms: 300,
        }
    }

    pub fn planner_limits(&self, nominal_feed_mm_s: f64, nominal_accel_mm_s2: f64) -> PlannerLimits {
        PlannerLimits {
            max_feed_mm_s: nominal_feed_mm_s.min(self.max_feed_mm_s),
            max_accel_mm_s2: nominal_accel_mm_s2.min(self.max_accel_mm_s2),
            max_cornering_mm: self.max_cornering_mm,
            min_segment_mm: self.min_segment_mm,
            pen_up_feed_mm_s: self.pen_up_feed_mm_s,
        }
    }

    pub fn stepper_settings(&self) -> StepperSettings {
        StepperSettings {
            steps_per_mm: self.steps_per_mm,
            kinematics: self.kinematics,
        }
    }
}
