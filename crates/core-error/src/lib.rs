//! Shared error taxonomy for the cplot pipeline.
//!
//! Every crate in the workspace returns `core_error::Result<T>`. The
//! variant set matches the error kinds named in the design: argument and
//! config problems are usage mistakes (exit code 2 at the CLI boundary),
//! everything else is a runtime failure (exit code 1). `Overflow` is
//! carried as data on successful results, never returned as an `Err` —
//! callers that saturate a value log a warning and keep going.

use std::fmt;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("argument error: {0}")]
    Argument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("device busy: {0}")]
    DeviceBusy(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlotError {
    /// Process exit code per the policy: argument/config issues are usage
    /// errors (2), everything else is a runtime error (1).
    pub fn exit_code(&self) -> i32 {
        match self {
            PlotError::Argument(_) | PlotError::Config(_) => 2,
            _ => 1,
        }
    }

    pub fn argument(msg: impl fmt::Display) -> Self {
        PlotError::Argument(msg.to_string())
    }
    pub fn config(msg: impl fmt::Display) -> Self {
        PlotError::Config(msg.to_string())
    }
    pub fn invalid_input(msg: impl fmt::Display) -> Self {
        PlotError::InvalidInput(msg.to_string())
    }
    pub fn resource(msg: impl fmt::Display) -> Self {
        PlotError::Resource(msg.to_string())
    }
    pub fn device_busy(msg: impl fmt::Display) -> Self {
        PlotError::DeviceBusy(msg.to_string())
    }
    pub fn device_not_found(msg: impl fmt::Display) -> Self {
        PlotError::DeviceNotFound(msg.to_string())
    }
    pub fn io(msg: impl fmt::Display) -> Self {
        PlotError::Io(msg.to_string())
    }
    pub fn protocol(msg: impl fmt::Display) -> Self {
        PlotError::Protocol(msg.to_string())
    }
    pub fn timeout(msg: impl fmt::Display) -> Self {
        PlotError::Timeout(msg.to_string())
    }
    pub fn internal(msg: impl fmt::Display) -> Self {
        PlotError::Internal(msg.to_string())
    }
}

impl From<std::io::Error> for PlotError {
    fn from(e: std::io::Error) -> Self {
        PlotError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_and_config_exit_usage() {
        assert_eq!(PlotError::argument("x").exit_code(), 2);
        assert_eq!(PlotError::config("x").exit_code(), 2);
    }

    #[test]
    fn everything_else_exits_runtime() {
        assert_eq!(PlotError::io("x").exit_code(), 1);
        assert_eq!(PlotError::timeout("x").exit_code(), 1);
        assert_eq!(PlotError::protocol("x").exit_code(), 1);
        assert_eq!(PlotError::device_busy("x").exit_code(), 1);
        assert_eq!(PlotError::device_not_found("x").exit_code(), 1);
        assert_eq!(PlotError::internal("x").exit_code(), 1);
        assert_eq!(PlotError::resource("x").exit_code(), 1);
        assert_eq!(PlotError::invalid_input("x").exit_code(), 1);
    }
}
