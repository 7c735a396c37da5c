use core_error::{PlotError, Result};
use serde::{Deserialize, Serialize};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// The persisted shape of `cplot.toml`. Every field here is named in the
/// wire contract: page geometry, a default point size and font family,
/// nominal motion limits, servo calibration, and the device alias to try
/// first. Unknown fields are rejected rather than ignored — a typo in a
/// key should fail loudly, not silently vanish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "default_orientation")]
    pub orientation: Orientation,
    #[serde(default = "default_paper_width")]
    pub paper_width_mm: f64,
    #[serde(default = "default_paper_height")]
    pub paper_height_mm: f64,
    #[serde(default = "default_margin")]
    pub margin_top_mm: f64,
    #[serde(default = "default_margin")]
    pub margin_right_mm: f64,
    #[serde(default = "default_margin")]
    pub margin_bottom_mm: f64,
    #[serde(default = "default_margin")]
    pub margin_left_mm: f64,

    #[serde(default = "default_point_size")]
    pub default_point_size_pt: f64,
    #[serde(default = "default_family_id")]
    pub default_family_id: String,

    #[serde(default = "default_feed")]
    pub nominal_feed_mm_s: f64,
    #[serde(default = "default_accel")]
    pub nominal_accel_mm_s2: f64,

    #[serde(default = "default_servo_pen_up")]
    pub servo_pen_up: i32,
    #[serde(default = "default_servo_pen_down")]
    pub servo_pen_down: i32,
    #[serde(default = "default_servo_speed")]
    pub servo_speed: i32,
    #[serde(default = "default_servo_delay_ms")]
    pub servo_delay_ms: u32,
    #[serde(default = "default_servo_timeout_ms")]
    pub servo_timeout_ms: u32,

    #[serde(default)]
    pub default_device_alias: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            orientation: default_orientation(),
            paper_width_mm: default_paper_width(),
            paper_height_mm: default_paper_height(),
            margin_top_mm: default_margin(),
            margin_right_mm: default_margin(),
            margin_bottom_mm: default_margin(),
            margin_left_mm: default_margin(),
            default_point_size_pt: default_point_size(),
            default_family_id: default_family_id(),
            nominal_feed_mm_s: default_feed(),
            nominal_accel_mm_s2: default_accel(),
            servo_pen_up: default_servo_pen_up(),
            servo_pen_down: default_servo_pen_down(),
            servo_speed: default_servo_speed(),
            servo_delay_ms: default_servo_delay_ms(),
            servo_timeout_ms: default_servo_timeout_ms(),
            default_device_alias: None,
        }
    }
}

impl ConfigFile {
    pub fn validate(&self) -> Result<()> {
        if self.paper_width_mm <= 0.0 || self.paper_height_mm <= 0.0 {
            return Err(PlotError::config("paper dimensions must be positive"));
        }
        if self.margin_top_mm < 0.0
            || self.margin_right_mm < 0.0
            || self.margin_bottom_mm < 0.0
            || self.margin_left_mm < 0.0
        {
            return Err(PlotError::config("margins must be non-negative"));
        }
        let (w, h) = match self.orientation {
            Orientation::Portrait => (self.paper_width_mm, self.paper_height_mm),
            Orientation::Landscape => (self.paper_height_mm, self.paper_width_mm),
        };
        if w - self.margin_left_mm - self.margin_right_mm <= 0.0
            || h - self.margin_top_mm - self.margin_bottom_mm <= 0.0
        {
            return Err(PlotError::config("margins leave a non-positive work area"));
        }
        if self.default_point_size_pt <= 0.0 {
            return Err(PlotError::config("default_point_size_pt must be positive"));
        }
        if self.default_family_id.trim().is_empty() {
            return Err(PlotError::config("default_family_id must not be empty"));
        }
        if self.nominal_feed_mm_s <= 0.0 || self.nominal_accel_mm_s2 <= 0.0 {
            return Err(PlotError::config("nominal feed and accel must be positive"));
        }
        if self.servo_delay_ms == 0 {
            return Err(PlotError::config("servo_delay_ms must be positive"));
        }
        Ok(())
    }
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}
fn default_orientation() -> Orientation {
    Orientation::Portrait
}
fn default_paper_width() -> f64 {
    210.0
}
fn default_paper_height() -> f64 {
    297.0
}
fn default_margin() -> f64 {
    10.0
}
fn default_point_size() -> f64 {
    18.0
}
fn default_family_id() -> String {
    "default-sans".to_string()
}
fn default_feed() -> f64 {
    60.0
}
fn default_accel() -> f64 {
    400.0
}
fn default_servo_pen_up() -> i32 {
    12000
}
fn default_servo_pen_down() -> i32 {
    16000
}
fn default_servo_speed() -> i32 {
    10000
}
fn default_servo_delay_ms() -> u32 {
    300
}
fn default_servo_timeout_ms() -> u32 {
    60000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        ConfigFile::default().validate().unwrap();
    }

    #[test]
    fn zero_paper_size_is_rejected() {
        let mut cfg = ConfigFile::default();
        cfg.paper_width_mm = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn margins_that_consume_the_whole_page_are_rejected() {
        let mut cfg = ConfigFile::default();
        cfg.margin_left_mm = 110.0;
        cfg.margin_right_mm = 110.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn landscape_swaps_width_and_height_for_the_work_area_check() {
        let mut cfg = ConfigFile::default();
        cfg.orientation = Orientation::Landscape;
        cfg.paper_width_mm = 297.0;
        cfg.paper_height_mm = 210.0;
        cfg.validate().unwrap();
    }
}
