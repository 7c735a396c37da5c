use core_error::{PlotError, Result};

use crate::kinematics::Kinematics;

#[derive(Debug, Clone, Copy)]
pub struct StepperSettings {
    pub steps_per_mm: f64,
    pub kinematics: Kinematics,
}

impl StepperSettings {
    pub fn validate(&self) -> Result<()> {
        if self.steps_per_mm <= 0.0 {
            return Err(PlotError::config("steps_per_mm must be positive"));
        }
        Ok(())
    }
}
