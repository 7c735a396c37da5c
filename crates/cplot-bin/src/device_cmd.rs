use std::time::Duration;

use core_device::{DeviceSession, SessionOptions};
use core_ebb::Command;
use core_error::Result;

use crate::cli::{DeviceOp, PenAction, PowerAction};
use crate::profile::MotionProfile;

const COMMAND_TIMEOUT: Duration = Duration::from_millis(500);
const MIN_COMMAND_INTERVAL: Duration = Duration::from_millis(5);

fn session_options(alias: Option<String>, profile: &MotionProfile) -> SessionOptions {
    SessionOptions {
        lock_path: crate::lock_path(),
        alias,
        settings: profile.stepper_settings(),
        command_timeout: COMMAND_TIMEOUT,
        min_command_interval: MIN_COMMAND_INTERVAL,
    }
}

/// Dispatch a `device <op>` subcommand. `list` and `profile` never touch
/// the device and so never acquire the lock; every other op opens a full
/// session, runs its callback, and releases everything on the way out
/// regardless of outcome.
pub fn run(op: DeviceOp, alias: Option<String>) -> Result<()> {
    let profile = MotionProfile::builtin();
    match op {
        DeviceOp::List => {
            for port in core_device::enumerate_ports()? {
                println!("{port}");
            }
            Ok(())
        }
        DeviceOp::Profile => {
            println!("{profile:#?}");
            Ok(())
        }
        DeviceOp::Pen { action } => with_session(alias, &profile, |session| {
            // The EBB's `SP` state bit is 1 = pen up, 0 = pen down.
            let settle = profile.servo_settle_ms;
            session.execute(|c| match action {
                PenAction::Up => c.exec(&Command::pen(true, Some(settle), None)).map(|_| ()),
                PenAction::Down => c.exec(&Command::pen(false, Some(settle), None)).map(|_| ()),
                PenAction::Toggle => {
                    let currently_up = c.query_pen()?.up;
                    c.exec(&Command::pen(!currently_up, Some(settle), None)).map(|_| ())
                }
            })
        }),
        DeviceOp::Motors { action } => with_session(alias, &profile, |session| {
            let (m1, m2) = match action {
                PowerAction::On => (1, 1),
                PowerAction::Off => (0, 0),
            };
            session.execute(|c| c.exec(&Command::motor_enable(m1, m2)).map(|_| ()))
        }),
        DeviceOp::Jog { dx, dy } => with_session(alias, &profile, |session| {
            let steps_per_mm = profile.steps_per_mm;
            let (da, db) = profile.kinematics.project(dx, dy);
            let steps_a = (da * steps_per_mm).round() as i32;
            let steps_b = (db * steps_per_mm).round() as i32;
            let distance_mm = dx.hypot(dy).max(1e-6);
            let duration_ms = ((distance_mm / profile.max_feed_mm_s) * 1000.0).round().clamp(1.0, (1 << 24) as f64 - 1.0) as u32;
            session.execute(|c| {
                c.exec(&Command::move_steps(jog_move_kind(profile.kinematics), duration_ms, steps_a, steps_b)?)
                    .map(|_| ())
            })?;
            session.wait_idle()
        }),
        DeviceOp::Home => with_session(alias, &profile, |session| {
            let rate = (profile.max_feed_mm_s * profile.steps_per_mm).round().clamp(2.0, 25000.0) as u32;
            session.execute(|c| c.exec(&Command::home(rate, None)).map(|_| ()))?;
            session.wait_idle()
        }),
        DeviceOp::Status => with_session(alias, &profile, |session| {
            session.execute(|c| {
                let motion = c.query_motion()?;
                let pen = c.query_pen()?;
                let servo = c.query_servo_power()?;
                println!(
                    "motion: command_active={} motor1={} motor2={} fifo={}",
                    motion.command_active, motion.motor1_active, motion.motor2_active, motion.fifo_pending
                );
                println!("pen_up={} servo_powered={}", pen.up, servo.powered);
                Ok(())
            })
        }),
        DeviceOp::Position => with_session(alias, &profile, |session| {
            session.execute(|c| {
                let steps = c.query_steps()?;
                println!("axis1={} axis2={}", steps.axis1, steps.axis2);
                Ok(())
            })
        }),
        DeviceOp::Reset => with_session(alias, &profile, |session| {
            session.execute(|c| c.exec(&Command::clear_step_counters()).map(|_| ()))
        }),
        DeviceOp::Reboot => with_session(alias, &profile, |session| {
            session.execute(|c| c.exec(&Command::reboot()).map(|_| ()))
        }),
        DeviceOp::Abort => with_session(alias, &profile, |session| {
            session.execute(|c| c.emergency_stop())
        }),
        DeviceOp::Version => with_session(alias, &profile, |session| {
            session.execute(|c| {
                let version = c.version()?;
                println!("{version}");
                Ok(())
            })
        }),
    }
}

fn jog_move_kind(kinematics: core_stepper::Kinematics) -> core_ebb::MoveKind {
    match kinematics {
        core_stepper::Kinematics::Cartesian => core_ebb::MoveKind::Cartesian,
        core_stepper::Kinematics::CoreXY => core_ebb::MoveKind::CoreXy,
    }
}

fn with_session(
    alias: Option<String>,
    profile: &MotionProfile,
    f: impl FnOnce(&mut DeviceSession) -> Result<()>,
) -> Result<()> {
    let mut session = DeviceSession::open(session_options(alias, profile))?;
    f(&mut session)
}
