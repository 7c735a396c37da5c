use core_error::{PlotError, Result};

use crate::file::{ConfigFile, Orientation};

/// Apply a single `key=value` pair from `config set k=v[,k=v...]`.
/// Unknown keys and unparsable values are `ArgumentError` (a usage
/// mistake, not a runtime failure); the caller re-validates the whole
/// config afterward so an individually well-formed value that produces
/// an inconsistent config is still caught.
pub fn apply_kv(config: &mut ConfigFile, key: &str, value: &str) -> Result<()> {
    match key {
        "orientation" => config.orientation = parse_orientation(value)?,
        "paper_width_mm" => config.paper_width_mm = parse_f64(key, value)?,
        "paper_height_mm" => config.paper_height_mm = parse_f64(key, value)?,
        "margin_top_mm" => config.margin_top_mm = parse_f64(key, value)?,
        "margin_right_mm" => config.margin_right_mm = parse_f64(key, value)?,
        "margin_bottom_mm" => config.margin_bottom_mm = parse_f64(key, value)?,
        "margin_left_mm" => config.margin_left_mm = parse_f64(key, value)?,
        "default_point_size_pt" => config.default_point_size_pt = parse_f64(key, value)?,
        "default_family_id" => config.default_family_id = value.to_string(),
        "nominal_feed_mm_s" => config.nominal_feed_mm_s = parse_f64(key, value)?,
        "nominal_accel_mm_s2" => config.nominal_accel_mm_s2 = parse_f64(key, value)?,
        "servo_pen_up" => config.servo_pen_up = parse_i32(key, value)?,
        "servo_pen_down" => config.servo_pen_down = parse_i32(key, value)?,
        "servo_speed" => config.servo_speed = parse_i32(key, value)?,
        "servo_delay_ms" => config.servo_delay_ms = parse_u32(key, value)?,
        "servo_timeout_ms" => config.servo_timeout_ms = parse_u32(key, value)?,
        "default_device_alias" => {
            config.default_device_alias = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        other => return Err(PlotError::argument(format!("unknown config key '{other}'"))),
    }
    Ok(())
}

fn parse_orientation(value: &str) -> Result<Orientation> {
    match value.to_ascii_lowercase().as_str() {
        "portrait" => Ok(Orientation::Portrait),
        "landscape" => Ok(Orientation::Landscape),
        other => Err(PlotError::argument(format!("orientation must be portrait or landscape, got '{other}'"))),
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| PlotError::argument(format!("{key}: expected a number, got '{value}'")))
}

fn parse_i32(key: &str, value: &str) -> Result<i32> {
    value
        .parse()
        .map_err(|_| PlotError::argument(format!("{key}: expected an integer, got '{value}'")))
}

fn parse_u32(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| PlotError::argument(format!("{key}: expected a non-negative integer, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_a_known_numeric_key() {
        let mut cfg = ConfigFile::default();
        apply_kv(&mut cfg, "nominal_feed_mm_s", "80.0").unwrap();
        assert_eq!(cfg.nominal_feed_mm_s, 80.0);
    }

    #[test]
    fn sets_orientation_case_insensitively() {
        let mut cfg = ConfigFile::default();
        apply_kv(&mut cfg, "orientation", "Landscape").unwrap();
        assert_eq!(cfg.orientation, Orientation::Landscape);
    }

    #[test]
    fn unknown_key_is_argument_error() {
        let mut cfg = ConfigFile::default();
        let err = apply_kv(&mut cfg, "bogus", "1").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unparsable_value_is_argument_error() {
        let mut cfg = ConfigFile::default();
        let err = apply_kv(&mut cfg, "paper_width_mm", "wide").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
