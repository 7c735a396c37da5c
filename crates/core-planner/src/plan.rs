use core_error::Result;
use core_geom::{Mm, Point};
use tracing::trace;

use crate::limits::PlannerLimits;
use crate::segment::PlanSegment;

/// A segment's trapezoidal motion profile: how fast it enters, cruises,
/// and leaves, plus the mm split between the three phases.
#[derive(Debug, Clone, Copy)]
pub struct PlanBlock {
    pub seq: usize,
    pub dx: f64,
    pub dy: f64,
    pub length_mm: f64,
    pub entry_speed_mm_s: f64,
    pub cruise_speed_mm_s: f64,
    pub exit_speed_mm_s: f64,
    pub accel_distance_mm: f64,
    pub cruise_distance_mm: f64,
    pub decel_distance_mm: f64,
    pub pen_down: bool,
    pub nominal_speed_mm_s: f64,
}

impl PlanBlock {
    /// Total phase duration from the entry/cruise/exit speeds, using
    /// `t = 2d/(v1+v2)`, falling back to `d/max(v1,v2)` when both
    /// endpoints are at rest.
    pub fn duration_s(&self) -> f64 {
        phase_time(self.accel_distance_mm, self.entry_speed_mm_s, self.cruise_speed_mm_s)
            + phase_time(self.cruise_distance_mm, self.cruise_speed_mm_s, self.cruise_speed_mm_s)
            + phase_time(self.decel_distance_mm, self.cruise_speed_mm_s, self.exit_speed_mm_s)
    }
}

fn phase_time(distance: f64, v_start: f64, v_end: f64) -> f64 {
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

struct RawBlock {
    dx: f64,
    dy: f64,
    length: f64,
    nominal_speed: f64,
    pen_down: bool,
}

/// Plan a sequence of segments starting from `start` into trapezoidal
/// blocks. An empty segment list returns an empty block list, not an
/// error.
pub fn plan(start: Point<Mm>, segments: &[PlanSegment], limits: &PlannerLimits) -> Result<Vec<PlanBlock>> {
    limits.validate()?;

    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let raw = merge_short_segments(start, segments, limits);
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let n = raw.len();
    let mut junction = vec![0.0_f64; n + 1];

    // Forward pass: junction speed limited by cornering deviation, clamped
    // by the nominal speed on both sides of the corner, zeroed across a
    // pen-state change.
    for i in 1..n {
        let prev = &raw[i - 1];
        let cur = &raw[i];
        if prev.pen_down != cur.pen_down {
            junction[i] = 0.0;
            continue;
        }
        let cos_theta = unit_dot(prev, cur).clamp(-1.0, 1.0);
        let both_nominal = prev.nominal_speed.min(cur.nominal_speed);
        junction[i] = if (1.0 - cos_theta) < 1e-9 {
            both_nominal
        } else {
            let v_j = (limits.max_accel_mm_s2 * limits.max_cornering_mm * (1.0 + cos_theta) / (1.0 - cos_theta)).sqrt();
            v_j.min(both_nominal)
        };
    }

    // Reverse pass: each block's entry speed must be decelerable to the
    // following junction speed within its own length.
    for i in (0..n).rev() {
        let limit = (junction[i + 1].powi(2) + 2.0 * limits.max_accel_mm_s2 * raw[i].length).sqrt();
        junction[i] = junction[i].min(limit);
    }

    // Forward pass: each block's exit speed must be reachable from its
    // entry speed within its own length.
    for i in 0..n {
        let limit = (junction[i].powi(2) + 2.0 * limits.max_accel_mm_s2 * raw[i].length).sqrt();
        junction[i + 1] = junction[i + 1].min(limit);
    }

    let mut blocks = Vec::with_capacity(n);
    for (i, r) in raw.iter().enumerate() {
        let entry = junction[i];
        let exit = junction[i + 1];
        let nominal = r.nominal_speed;
        let a = limits.max_accel_mm_s2;

        let mut accel_distance = ((nominal.powi(2) - entry.powi(2)) / (2.0 * a)).max(0.0);
        let mut decel_distance = ((nominal.powi(2) - exit.powi(2)) / (2.0 * a)).max(0.0);
        let cruise_speed;
        let cruise_distance;

        if accel_distance + decel_distance > r.length {
            let peak_sq = ((2.0 * a * r.length + entry.powi(2) + exit.powi(2)) / 2.0).max(0.0);
            let peak = peak_sq.sqrt().min(nominal);
            accel_distance = ((peak.powi(2) - entry.powi(2)) / (2.0 * a)).clamp(0.0, r.length);
            decel_distance = (r.length - accel_distance).max(0.0);
            cruise_distance = 0.0;
            cruise_speed = peak;
        } else {
            cruise_distance = r.length - accel_distance - decel_distance;
            cruise_speed = nominal;
        }

        trace!(
            target: "core_planner::plan",
            seq = i,
            entry, exit, cruise_speed, accel_distance, cruise_distance, decel_distance,
            "planned block"
        );

        blocks.push(PlanBlock {
            seq: i,
            dx: r.dx,
            dy: r.dy,
            length_mm: r.length,
            entry_speed_mm_s: entry,
            cruise_speed_mm_s: cruise_speed,
            exit_speed_mm_s: exit,
            accel_distance_mm: accel_distance,
            cruise_distance_mm: cruise_distance,
            decel_distance_mm: decel_distance,
            pen_down: r.pen_down,
            nominal_speed_mm_s: nominal,
        });
    }

    Ok(blocks)
}

fn unit_dot(a: &RawBlock, b: &RawBlock) -> f64 {
    let la = a.length.max(1e-12);
    let lb = b.length.max(1e-12);
    (a.dx / la) * (b.dx / lb) + (a.dy / la) * (b.dy / lb)
}

fn merge_short_segments(start: Point<Mm>, segments: &[PlanSegment], limits: &PlannerLimits) -> Vec<RawBlock> {
    let mut raw: Vec<RawBlock> = Vec::with_capacity(segments.len());
    let mut cursor = start;

    for seg in segments {
        let dx = seg.target.x - cursor.x;
        let dy = seg.target.y - cursor.y;
        let length = (dx * dx + dy * dy).sqrt();
        cursor = seg.target;

        let nominal_speed = if seg.pen_down {
            seg.feed_mm_s.min(limits.max_feed_mm_s)
        } else {
            limits.pen_up_feed_mm_s.min(limits.max_feed_mm_s)
        };

        if length < limits.min_segment_mm {
            if let Some(last) = raw.last_mut() {
                if last.pen_down == seg.pen_down {
                    last.dx += dx;
                    last.dy += dy;
                    last.length = (last.dx * last.dx + last.dy * last.dy).sqrt();
                    last.nominal_speed = last.nominal_speed.max(nominal_speed);
                    continue;
                }
            }
        }

        raw.push(RawBlock {
            dx,
            dy,
            length,
            nominal_speed,
            pen_down: seg.pen_down,
        });
    }

    raw.retain(|b| b.length > 0.0);
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PlannerLimits {
        PlannerLimits {
            max_feed_mm_s: 100.0,
            max_accel_mm_s2: 1000.0,
            max_cornering_mm: 0.1,
            min_segment_mm: 0.05,
            pen_up_feed_mm_s: 150.0,
        }
    }

    #[test]
    fn empty_segments_plan_to_empty_blocks() {
        let blocks = plan(Point::origin(), &[], &limits()).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn single_segment_produces_symmetric_trapezoid() {
        let segs = [PlanSegment::new(Point::new(100.0, 0.0), 100.0, true)];
        let blocks = plan(Point::origin(), &segs, &limits()).unwrap();
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert!((b.accel_distance_mm - 5.0).abs() < 1e-6);
        assert!((b.decel_distance_mm - 5.0).abs() < 1e-6);
        assert!((b.cruise_distance_mm - 90.0).abs() < 1e-6);
        assert!((b.entry_speed_mm_s - 0.0).abs() < 1e-9);
        assert!((b.exit_speed_mm_s - 0.0).abs() < 1e-9);
    }

    #[test]
    fn short_segment_length_stays_feasible_everywhere() {
        let segs = [
            PlanSegment::new(Point::new(1.0, 0.0), 50.0, true),
            PlanSegment::new(Point::new(1.0, 0.01), 50.0, true),
        ];
        let blocks = plan(Point::origin(), &segs, &limits()).unwrap();
        for w in blocks.windows(2) {
            let a = &w[0];
            let b = &w[1];
            assert!(a.exit_speed_mm_s.powi(2) <= b.entry_speed_mm_s.powi(2) + 2.0 * limits().max_accel_mm_s2 * a.length_mm + 1e-6);
        }
    }

    #[test]
    fn pen_state_change_forces_zero_junction() {
        let segs = [
            PlanSegment::new(Point::new(50.0, 0.0), 100.0, false),
            PlanSegment::new(Point::new(100.0, 0.0), 100.0, true),
        ];
        let blocks = plan(Point::origin(), &segs, &limits()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!((blocks[0].exit_speed_mm_s).abs() < 1e-9);
        assert!((blocks[1].entry_speed_mm_s).abs() < 1e-9);
    }

    #[test]
    fn invalid_limits_are_a_config_error() {
        let mut bad = limits();
        bad.max_accel_mm_s2 = 0.0;
        let segs = [PlanSegment::new(Point::new(1.0, 0.0), 10.0, true)];
        let err = plan(Point::origin(), &segs, &bad).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn right_angle_corner_limits_junction_speed() {
        let segs = [
            PlanSegment::new(Point::new(50.0, 0.0), 100.0, true),
            PlanSegment::new(Point::new(50.0, 50.0), 100.0, true),
        ];
        let blocks = plan(Point::origin(), &segs, &limits()).unwrap();
        assert!(blocks[0].exit_speed_mm_s < 100.0);
        assert!(blocks[0].exit_speed_mm_s >= 0.0);
    }
}
