use serde::{Deserialize, Serialize};

use crate::{Fps, UnitPosition};

/// The part of a sequence the focus-range editor needs: its length in unit
/// time and the frame grid positions snap to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sequence {
    pub length: f64,
    pub fps: Fps,
}

impl Sequence {
    pub fn new(length: f64, fps: Fps) -> Self {
        Self { length, fps }
    }

    /// Duration of one frame in unit time.
    pub fn frame_duration(&self) -> f64 {
        self.fps.den as f64 / self.fps.num as f64
    }

    /// Snaps a position to the nearest frame-grid multiple. Idempotent;
    /// does not clamp to `[0, length]` (callers clamp first).
    pub fn closest_grid_position(&self, pos: UnitPosition) -> UnitPosition {
        let step = self.frame_duration();
        (pos / step).round() * step
    }
}
