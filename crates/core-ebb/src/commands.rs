use core_error::{PlotError, Result};

const MAX_DURATION_MS: i64 = (1 << 24) - 1;
const MAX_STEPS: i64 = (1 << 24) - 1;
const MIN_STEPS: i64 = -((1 << 24) - 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Cartesian,
    CoreXy,
}

/// A validated, ready-to-send EBB command. Construction validates every
/// parameter range named in the wire protocol; a built `Command` always
/// serializes to a well-formed ASCII line.
#[derive(Debug, Clone)]
pub struct Command(String);

impl Command {
    pub fn as_line(&self) -> &str {
        &self.0
    }

    pub fn motor_enable(m1: u8, m2: u8) -> Result<Self> {
        range_check("m1", m1 as i64, 0, 5)?;
        range_check("m2", m2 as i64, 0, 5)?;
        Ok(Self(format!("EM,{m1},{m2}")))
    }

    pub fn move_steps(kind: MoveKind, duration_ms: u32, steps1: i32, steps2: i32) -> Result<Self> {
        range_check("duration_ms", duration_ms as i64, 1, MAX_DURATION_MS)?;
        range_check("steps1", steps1 as i64, MIN_STEPS, MAX_STEPS)?;
        range_check("steps2", steps2 as i64, MIN_STEPS, MAX_STEPS)?;
        let tag = match kind {
            MoveKind::Cartesian => "SM",
            MoveKind::CoreXy => "XM",
        };
        Ok(Self(format!("{tag},{duration_ms},{steps1},{steps2}")))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn low_level_move_steps(
        rate1: u32,
        steps1: i32,
        accel1: i32,
        rate2: u32,
        steps2: i32,
        accel2: i32,
        clear: Option<(bool, bool)>,
    ) -> Result<Self> {
        range_check("steps1", steps1 as i64, MIN_STEPS, MAX_STEPS)?;
        range_check("steps2", steps2 as i64, MIN_STEPS, MAX_STEPS)?;
        let base = format!("LM,{rate1},{steps1},{accel1},{rate2},{steps2},{accel2}");
        Ok(Self(append_clear(base, clear)))
    }

    pub fn low_level_move_time(
        intervals: u32,
        rate1: i32,
        accel1: i32,
        rate2: i32,
        accel2: i32,
        clear: Option<(bool, bool)>,
    ) -> Result<Self> {
        if intervals == 0 {
            return Err(PlotError::argument("intervals must be positive"));
        }
        let base = format!("LT,{intervals},{rate1},{accel1},{rate2},{accel2}");
        Ok(Self(append_clear(base, clear)))
    }

    pub fn home(rate: u32, positions: Option<(i32, i32)>) -> Result<Self> {
        range_check("rate", rate as i64, 2, 25000)?;
        let mut line = format!("HM,{rate}");
        if let Some((p1, p2)) = positions {
            line.push_str(&format!(",{p1},{p2}"));
        }
        Ok(Self(line))
    }

    pub fn pen(state: bool, settle_ms: Option<u32>, portb_pin: Option<u8>) -> Result<Self> {
        let mut line = format!("SP,{}", if state { 1 } else { 0 });
        if let Some(settle) = settle_ms {
            line.push_str(&format!(",{settle}"));
            if let Some(pin) = portb_pin {
                line.push_str(&format!(",{pin}"));
            }
        }
        Ok(Self(line))
    }

    pub fn servo_config(param: u8, value: i32) -> Result<Self> {
        Ok(Self(format!("SC,{param},{value}")))
    }

    pub fn servo_timeout(timeout_ms: u32, state: Option<bool>) -> Result<Self> {
        let mut line = format!("SR,{timeout_ms}");
        if let Some(s) = state {
            line.push_str(&format!(",{}", if s { 1 } else { 0 }));
        }
        Ok(Self(line))
    }

    pub fn query_motion() -> Self {
        Self("QM".into())
    }
    pub fn query_steps() -> Self {
        Self("QS".into())
    }
    pub fn query_pen() -> Self {
        Self("QP".into())
    }
    pub fn query_servo_power() -> Self {
        Self("QR".into())
    }
    pub fn version() -> Self {
        Self("V".into())
    }
    pub fn emergency_stop() -> Self {
        Self("ES".into())
    }
    pub fn clear_step_counters() -> Self {
        Self("CS".into())
    }
    pub fn reboot() -> Self {
        Self("RB".into())
    }
}

fn append_clear(mut base: String, clear: Option<(bool, bool)>) -> String {
    if let Some((c1, c2)) = clear {
        base.push_str(&format!(",{}", (c1 as u8) | ((c2 as u8) << 1)));
    }
    base
}

fn range_check(name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(PlotError::argument(format!(
            "{name}={value} out of range [{min}, {max}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_enable_rejects_out_of_range_mode() {
        assert!(Command::motor_enable(6, 0).is_err());
        assert!(Command::motor_enable(0, 5).is_ok());
    }

    #[test]
    fn move_steps_formats_sm_and_xm() {
        let sm = Command::move_steps(MoveKind::Cartesian, 500, 100, -50).unwrap();
        assert_eq!(sm.as_line(), "SM,500,100,-50");
        let xm = Command::move_steps(MoveKind::CoreXy, 500, 100, -50).unwrap();
        assert_eq!(xm.as_line(), "XM,500,100,-50");
    }

    #[test]
    fn move_steps_rejects_zero_duration() {
        assert!(Command::move_steps(MoveKind::Cartesian, 0, 0, 0).is_err());
    }

    #[test]
    fn home_requires_rate_within_device_bounds() {
        assert!(Command::home(1, None).is_err());
        assert!(Command::home(25001, None).is_err());
        assert!(Command::home(1000, Some((0, 0))).is_ok());
    }

    #[test]
    fn pen_without_settle_omits_trailing_fields() {
        let cmd = Command::pen(true, None, None).unwrap();
        assert_eq!(cmd.as_line(), "SP,1");
    }

    #[test]
    fn queries_are_fixed_strings() {
        assert_eq!(Command::query_motion().as_line(), "QM");
        assert_eq!(Command::version().as_line(), "V");
        assert_eq!(Command::emergency_stop().as_line(), "ES");
    }
}
