use core_geom::{Mm, PathCollection, Point};
use core_planner::PlanSegment;

/// Convert composed page geometry into planner segments: pen-up to the
/// first path's start, pen-down between consecutive points within a
/// path, and pen-up repositioning between paths.
pub fn paths_to_segments(
    paths: &PathCollection<Mm>,
    draw_feed_mm_s: f64,
    travel_feed_mm_s: f64,
) -> (Point<Mm>, Vec<PlanSegment>) {
    let start = Point::<Mm>::origin();
    let mut segments = Vec::new();
    let mut cursor = start;

    for path in &paths.paths {
        if path.points.is_empty() {
            continue;
        }
        let first = path.points[0];
        if (first.x - cursor.x).abs() > 1e-9 || (first.y - cursor.y).abs() > 1e-9 {
            segments.push(PlanSegment::new(first, travel_feed_mm_s, false));
        }
        for point in path.points.iter().skip(1) {
            segments.push(PlanSegment::new(*point, draw_feed_mm_s, true));
        }
        cursor = *path.points.last().unwrap();
    }

    (start, segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Path;

    #[test]
    fn single_point_path_produces_only_a_travel_move() {
        let mut paths = PathCollection::new();
        paths.push(Path::from_points(vec![Point::new(5.0, 5.0)]));
        let (start, segments) = paths_to_segments(&paths, 60.0, 120.0);
        assert_eq!(start, Point::origin());
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].pen_down);
    }

    #[test]
    fn two_paths_insert_a_travel_move_between_them() {
        let mut paths = PathCollection::new();
        paths.push(Path::from_points(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]));
        paths.push(Path::from_points(vec![Point::new(20.0, 20.0), Point::new(30.0, 20.0)]));
        let (_, segments) = paths_to_segments(&paths, 60.0, 120.0);
        // travel to (0,0) is skipped since it matches the origin start exactly
        assert_eq!(segments.len(), 3);
        assert!(segments[0].pen_down);
        assert!(!segments[1].pen_down);
        assert!(segments[2].pen_down);
    }
}
