use core_error::{PlotError, Result};

/// Parsed `QM` reply: which motion-related flags are currently set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionStatus {
    pub command_active: bool,
    pub motor1_active: bool,
    pub motor2_active: bool,
    pub fifo_pending: bool,
}

impl MotionStatus {
    pub fn is_idle(&self) -> bool {
        !self.command_active && !self.motor1_active && !self.motor2_active && !self.fifo_pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCounters {
    pub axis1: i64,
    pub axis2: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenStatus {
    pub up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoPowerStatus {
    pub powered: bool,
}

/// Reject an error reply (`!`-prefixed) before a caller tries to parse
/// command-specific fields out of it.
pub fn check_error_reply(line: &str) -> Result<&str> {
    if let Some(msg) = line.strip_prefix('!') {
        return Err(PlotError::protocol(format!("controller error: {msg}")));
    }
    Ok(line)
}

pub fn parse_motion_status(line: &str) -> Result<MotionStatus> {
    let line = check_error_reply(line)?;
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 4 {
        return Err(PlotError::protocol(format!("malformed QM reply: {line}")));
    }
    Ok(MotionStatus {
        command_active: parse_flag(fields[0])?,
        motor1_active: parse_flag(fields[1])?,
        motor2_active: parse_flag(fields[2])?,
        fifo_pending: parse_flag(fields[3])?,
    })
}

pub fn parse_step_counters(line: &str) -> Result<StepCounters> {
    let line = check_error_reply(line)?;
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return Err(PlotError::protocol(format!("malformed QS reply: {line}")));
    }
    Ok(StepCounters {
        axis1: parse_int(fields[0])?,
        axis2: parse_int(fields[1])?,
    })
}

pub fn parse_pen_status(line: &str) -> Result<PenStatus> {
    let line = check_error_reply(line)?;
    Ok(PenStatus {
        up: parse_flag(line.trim())?,
    })
}

pub fn parse_servo_power(line: &str) -> Result<ServoPowerStatus> {
    let line = check_error_reply(line)?;
    Ok(ServoPowerStatus {
        powered: parse_flag(line.trim())?,
    })
}

pub fn parse_version(line: &str) -> Result<String> {
    let line = check_error_reply(line)?;
    Ok(line.trim().to_string())
}

fn parse_flag(field: &str) -> Result<bool> {
    match field.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(PlotError::protocol(format!("expected 0/1 flag, got {other}"))),
    }
}

fn parse_int(field: &str) -> Result<i64> {
    field
        .trim()
        .parse()
        .map_err(|_| PlotError::protocol(format!("expected integer, got {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_is_a_protocol_error() {
        let err = check_error_reply("!bad command").unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn motion_status_parses_all_idle() {
        let status = parse_motion_status("0,0,0,0").unwrap();
        assert!(status.is_idle());
    }

    #[test]
    fn motion_status_reports_active_fifo() {
        let status = parse_motion_status("0,0,0,1").unwrap();
        assert!(!status.is_idle());
        assert!(status.fifo_pending);
    }

    #[test]
    fn malformed_motion_status_is_protocol_error() {
        assert!(parse_motion_status("0,0").is_err());
    }
}
