//! Trajectory planning: segments in, trapezoidal-profile blocks out.
//!
//! The planner runs the classic three-pass lookahead (forward junction
//! limiting, reverse deceleration feasibility, forward acceleration
//! feasibility) used by grbl-family firmwares, adapted to operate on
//! whole plan blocks rather than a ring buffer.

mod limits;
mod plan;
mod segment;

pub use limits::PlannerLimits;
pub use plan::{plan, PlanBlock};
pub use segment::PlanSegment;
