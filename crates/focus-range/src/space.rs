use serde::{Deserialize, Serialize};

use crate::UnitPosition;

/// View-dependent conversion between screen pixels and unit time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitScale {
    pub pixels_per_unit: f64,
}

impl UnitScale {
    pub fn new(pixels_per_unit: f64) -> Self {
        Self { pixels_per_unit }
    }

    pub fn to_unit_space(&self, pixels: f64) -> UnitPosition {
        pixels / self.pixels_per_unit
    }

    pub fn from_unit_space(&self, units: UnitPosition) -> f64 {
        units * self.pixels_per_unit
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self {
            pixels_per_unit: 1.0,
        }
    }
}
