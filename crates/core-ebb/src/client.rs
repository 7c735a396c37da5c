use std::thread;
use std::time::{Duration, Instant};

use core_error::Result;
use tracing::trace;

use crate::commands::Command;
use crate::link::EbbLink;
use crate::responses::{self, MotionStatus, PenStatus, ServoPowerStatus, StepCounters};

/// Drives a single EBB-class controller: enforces the minimum
/// inter-command interval and a per-command timeout, and exposes typed
/// wrappers over the raw query replies.
pub struct EbbClient<L: EbbLink> {
    link: L,
    min_interval: Duration,
    command_timeout: Duration,
    last_sent: Option<Instant>,
}

impl<L: EbbLink> EbbClient<L> {
    pub fn new(link: L, min_interval: Duration, command_timeout: Duration) -> Self {
        Self {
            link,
            min_interval,
            command_timeout,
            last_sent: None,
        }
    }

    /// Send a command and return its raw reply line, having already
    /// rejected a `!`-prefixed error reply.
    pub fn exec(&mut self, command: &Command) -> Result<String> {
        self.throttle();
        trace!(target: "core_ebb::client", command = command.as_line(), "sending");
        self.link.send_line(command.as_line())?;
        self.last_sent = Some(Instant::now());
        let reply = self.link.read_line(self.command_timeout)?;
        responses::check_error_reply(&reply)?;
        Ok(reply)
    }

    fn throttle(&self) {
        if let Some(last) = self.last_sent {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                thread::sleep(self.min_interval - elapsed);
            }
        }
    }

    pub fn query_motion(&mut self) -> Result<MotionStatus> {
        let reply = self.exec(&Command::query_motion())?;
        responses::parse_motion_status(&reply)
    }

    pub fn query_steps(&mut self) -> Result<StepCounters> {
        let reply = self.exec(&Command::query_steps())?;
        responses::parse_step_counters(&reply)
    }

    pub fn query_pen(&mut self) -> Result<PenStatus> {
        let reply = self.exec(&Command::query_pen())?;
        responses::parse_pen_status(&reply)
    }

    pub fn query_servo_power(&mut self) -> Result<ServoPowerStatus> {
        let reply = self.exec(&Command::query_servo_power())?;
        responses::parse_servo_power(&reply)
    }

    pub fn version(&mut self) -> Result<String> {
        let reply = self.exec(&Command::version())?;
        responses::parse_version(&reply)
    }

    /// Poll `QM` until the device reports idle, or give up after
    /// `max_attempts` with a `Timeout`. The protocol's default is a 20 ms
    /// poll period for up to 200 attempts (~4 s).
    pub fn wait_idle(&mut self, poll_period: Duration, max_attempts: u32) -> Result<()> {
        for _ in 0..max_attempts {
            if self.query_motion()?.is_idle() {
                return Ok(());
            }
            thread::sleep(poll_period);
        }
        Err(core_error::PlotError::timeout(format!(
            "device did not reach idle within {max_attempts} polls"
        )))
    }

    pub fn emergency_stop(&mut self) -> Result<()> {
        self.exec(&Command::emergency_stop()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MockLink;
    use std::collections::VecDeque;

    fn client_with_replies(replies: &[&str]) -> EbbClient<MockLink> {
        let link = MockLink {
            sent: Vec::new(),
            replies: replies.iter().map(|s| s.to_string()).collect::<VecDeque<_>>(),
        };
        EbbClient::new(link, Duration::from_millis(0), Duration::from_millis(100))
    }

    #[test]
    fn exec_records_the_sent_line() {
        let mut client = client_with_replies(&["OK"]);
        client.exec(&Command::query_motion()).unwrap();
        assert_eq!(client.link.sent, vec!["QM".to_string()]);
    }

    #[test]
    fn error_reply_propagates_as_protocol_error() {
        let mut client = client_with_replies(&["!NotReady"]);
        let err = client.exec(&Command::query_motion()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn wait_idle_returns_once_all_flags_clear() {
        let mut client = client_with_replies(&["0,1,0,0", "0,0,0,0"]);
        client.wait_idle(Duration::from_millis(0), 5).unwrap();
    }

    #[test]
    fn wait_idle_times_out_after_max_attempts() {
        let mut client = client_with_replies(&["0,1,0,0", "0,1,0,0"]);
        let err = client.wait_idle(Duration::from_millis(0), 2).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn version_trims_the_reply() {
        let mut client = client_with_replies(&["EBBv13 and 1.0\r"]);
        let v = client.version().unwrap();
        assert!(v.starts_with("EBBv13"));
    }
}
