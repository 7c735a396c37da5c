use core_error::Result;
use core_planner::PlanBlock;
use tracing::warn;

use crate::settings::StepperSettings;
use crate::EBB_INTERVAL_S;

/// One accel/cruise/decel segment of a block, reduced to motor steps,
/// timing, and the device's fixed-point rate/accel encoding.
#[derive(Debug, Clone, Copy)]
pub struct StepPhase {
    pub block_seq: usize,
    pub index: u8,
    pub distance_mm: f64,
    pub duration_s: f64,
    pub steps_a: i32,
    pub steps_b: i32,
    pub rate_start_a: u32,
    pub rate_end_a: u32,
    pub accel_a: i32,
    pub rate_start_b: u32,
    pub rate_end_b: u32,
    pub accel_b: i32,
}

struct PhaseSpan {
    distance: f64,
    v_start: f64,
    v_end: f64,
}

/// Convert a plan block into 1-3 phases. Phases with zero distance are
/// omitted. Step counts are distributed across phases proportionally to
/// distance, with the last phase absorbing the rounding remainder so the
/// per-axis sum always equals the block's total step count.
pub fn block_to_phases(block: &PlanBlock, settings: &StepperSettings) -> Result<Vec<StepPhase>> {
    settings.validate()?;

    let (delta_a_mm, delta_b_mm) = settings.kinematics.project(block.dx, block.dy);
    let total_a = mm_to_steps_saturating(delta_a_mm * settings.steps_per_mm);
    let total_b = mm_to_steps_saturating(delta_b_mm * settings.steps_per_mm);

    let spans = [
        PhaseSpan {
            distance: block.accel_distance_mm,
            v_start: block.entry_speed_mm_s,
            v_end: block.cruise_speed_mm_s,
        },
        PhaseSpan {
            distance: block.cruise_distance_mm,
            v_start: block.cruise_speed_mm_s,
            v_end: block.cruise_speed_mm_s,
        },
        PhaseSpan {
            distance: block.decel_distance_mm,
            v_start: block.cruise_speed_mm_s,
            v_end: block.exit_speed_mm_s,
        },
    ];

    let active: Vec<&PhaseSpan> = spans.iter().filter(|s| s.distance > 1e-9).collect();
    if active.is_empty() {
        return Ok(Vec::new());
    }

    let mut remaining_a = total_a;
    let mut remaining_b = total_b;
    let mut phases = Vec::with_capacity(active.len());

    for (i, span) in active.iter().enumerate() {
        let is_last = i + 1 == active.len();
        let fraction = if block.length_mm > 0.0 {
            span.distance / block.length_mm
        } else {
            0.0
        };

        let steps_a = if is_last {
            remaining_a
        } else {
            let s = (total_a as f64 * fraction).round() as i32;
            remaining_a -= s;
            s
        };
        let steps_b = if is_last {
            remaining_b
        } else {
            let s = (total_b as f64 * fraction).round() as i32;
            remaining_b -= s;
            s
        };

        let duration = phase_duration_s(span.distance, span.v_start, span.v_end);
        let intervals = ((duration / EBB_INTERVAL_S).round() as i64).max(1);

        let axis_a_per_mm = if block.length_mm > 0.0 {
            total_a as f64 / block.length_mm
        } else {
            0.0
        };
        let axis_b_per_mm = if block.length_mm > 0.0 {
            total_b as f64 / block.length_mm
        } else {
            0.0
        };

        let rate_start_a = encode_rate(span.v_start * axis_a_per_mm.abs());
        let rate_end_a = encode_rate(span.v_end * axis_a_per_mm.abs());
        let rate_start_b = encode_rate(span.v_start * axis_b_per_mm.abs());
        let rate_end_b = encode_rate(span.v_end * axis_b_per_mm.abs());

        phases.push(StepPhase {
            block_seq: block.seq,
            index: i as u8,
            distance_mm: span.distance,
            duration_s: duration,
            steps_a,
            steps_b,
            rate_start_a,
            rate_end_a,
            accel_a: encode_accel(rate_start_a, rate_end_a, intervals),
            rate_start_b,
            rate_end_b,
            accel_b: encode_accel(rate_start_b, rate_end_b, intervals),
        });
    }

    Ok(phases)
}

fn phase_duration_s(distance: f64, v_start: f64, v_end: f64) -> f64 {
    if distance <= 0.0 {
        return 0.0;
    }
    let sum = v_start + v_end;
    if sum > 0.0 {
        2.0 * distance / sum
    } else {
        distance / v_start.max(v_end).max(1e-9)
    }
}

/// Encode a steps-per-second rate into the EBB's 31-bit fixed-point
/// field: `rate * 2^31 * 40e-6`, clamped to `[0, 2^31 - 1]`.
fn encode_rate(steps_per_second: f64) -> u32 {
    if !steps_per_second.is_finite() {
        warn!(target: "core_stepper::phase", steps_per_second, "non-finite step rate, clamping to 0");
        return 0;
    }
    let encoded = steps_per_second * (1u64 << 31) as f64 * EBB_INTERVAL_S;
    encoded.round().clamp(0.0, (i32::MAX) as f64) as u32
}

fn encode_accel(rate_start: u32, rate_end: u32, intervals: i64) -> i32 {
    let delta = rate_end as i64 - rate_start as i64;
    let per_interval = delta as f64 / intervals as f64;
    per_interval.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// mm -> steps, saturating to i32. NaN/Inf become zero steps; both cases
/// only warn, never fail the pipeline.
fn mm_to_steps_saturating(mm: f64) -> i32 {
    if !mm.is_finite() {
        warn!(target: "core_stepper::phase", mm, "non-finite mm->steps conversion, using 0 steps");
        return 0;
    }
    let steps = mm.round();
    if steps > i32::MAX as f64 || steps < i32::MIN as f64 {
        warn!(target: "core_stepper::phase", mm, "mm->steps overflowed i32, saturating");
    }
    steps.clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::Kinematics;
    use core_planner::PlanBlock;

    fn block() -> PlanBlock {
        PlanBlock {
            seq: 0,
            dx: 12.345,
            dy: 0.0,
            length_mm: 12.345,
            entry_speed_mm_s: 0.0,
            cruise_speed_mm_s: 50.0,
            exit_speed_mm_s: 0.0,
            accel_distance_mm: 1.25,
            cruise_distance_mm: 9.845,
            decel_distance_mm: 1.25,
            pen_down: true,
            nominal_speed_mm_s: 50.0,
        }
    }

    fn settings() -> StepperSettings {
        StepperSettings {
            steps_per_mm: 80.0,
            kinematics: Kinematics::Cartesian,
        }
    }

    #[test]
    fn phase_steps_sum_to_block_total_exactly() {
        let b = block();
        let phases = block_to_phases(&b, &settings()).unwrap();
        let total_steps_a: i32 = phases.iter().map(|p| p.steps_a).sum();
        let expected = (b.dx * settings().steps_per_mm).round() as i32;
        assert_eq!(total_steps_a, expected);
        assert_eq!(expected, 988);
    }

    #[test]
    fn phase_durations_sum_to_block_duration() {
        let b = block();
        let phases = block_to_phases(&b, &settings()).unwrap();
        let total: f64 = phases.iter().map(|p| p.duration_s).sum();
        let expected = b.duration_s();
        assert!((total - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_distance_phase_is_omitted() {
        let mut b = block();
        b.accel_distance_mm = 0.0;
        b.decel_distance_mm = 0.0;
        b.cruise_distance_mm = b.length_mm;
        b.entry_speed_mm_s = b.cruise_speed_mm_s;
        b.exit_speed_mm_s = b.cruise_speed_mm_s;
        let phases = block_to_phases(&b, &settings()).unwrap();
        assert_eq!(phases.len(), 1);
    }

    #[test]
    fn corexy_projects_through_sum_and_difference() {
        let mut b = block();
        b.dx = 10.0;
        b.dy = 4.0;
        b.length_mm = (10.0_f64.powi(2) + 4.0_f64.powi(2)).sqrt();
        let mut s = settings();
        s.kinematics = Kinematics::CoreXY;
        let phases = block_to_phases(&b, &s).unwrap();
        let total_a: i32 = phases.iter().map(|p| p.steps_a).sum();
        let total_b: i32 = phases.iter().map(|p| p.steps_b).sum();
        assert_eq!(total_a, ((10.0 + 4.0) * s.steps_per_mm).round() as i32);
        assert_eq!(total_b, ((10.0 - 4.0) * s.steps_per_mm).round() as i32);
    }

    #[test]
    fn non_finite_delta_saturates_to_zero_steps() {
        let mut b = block();
        b.dx = f64::NAN;
        let phases = block_to_phases(&b, &settings()).unwrap();
        assert!(phases.iter().all(|p| p.steps_a == 0));
    }

    #[test]
    fn invalid_steps_per_mm_is_a_config_error() {
        let mut s = settings();
        s.steps_per_mm = 0.0;
        let err = block_to_phases(&block(), &s).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
