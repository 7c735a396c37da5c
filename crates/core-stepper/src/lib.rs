//! Converts planner blocks into per-axis motor phases: step counts, step
//! rates, and accelerations encoded in the EBB's fixed-point time base.

mod kinematics;
mod phase;
mod settings;

pub use kinematics::Kinematics;
pub use phase::{block_to_phases, StepPhase};
pub use settings::StepperSettings;

/// One EBB low-level-move time unit, in seconds.
pub const EBB_INTERVAL_S: f64 = 40e-6;
