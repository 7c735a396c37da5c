//! ASCII command framing for the EiBotBoard: build validated command
//! strings, send them over a [`EbbLink`], and parse structured replies.

mod client;
mod commands;
mod link;
mod responses;

pub use client::EbbClient;
pub use commands::{Command, MoveKind};
pub use link::{EbbLink, SerialLink};
pub use responses::{MotionStatus, PenStatus, ServoPowerStatus, StepCounters};
