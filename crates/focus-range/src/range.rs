use serde::{Deserialize, Serialize};

use crate::UnitPosition;

/// A focus range interval in unit time, invariant `start <= end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub start: UnitPosition,
    pub end: UnitPosition,
}

impl Range {
    pub fn new(start: UnitPosition, end: UnitPosition) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive on both ends, matching the playback position check.
    pub fn contains(&self, pos: UnitPosition) -> bool {
        pos >= self.start && pos <= self.end
    }

    pub fn translated(&self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Clamps this range into `reference`, preserving its width when it fits.
    ///
    /// A range wider than the reference cannot be shifted into it; each bound
    /// is clamped independently instead. A fitting range is shifted as a
    /// whole by the overflow of whichever bound sticks out.
    ///
    /// ```
    /// use focus_range::Range;
    ///
    /// let reference = Range::new(2.0, 3.0);
    /// assert_eq!(Range::new(-1.0, 4.0).clamp_to(&reference), reference);
    /// assert_eq!(
    ///     Range::new(-1.0, 2.5).clamp_to(&reference),
    ///     Range::new(2.0, 2.5)
    /// );
    /// ```
    pub fn clamp_to(&self, reference: &Range) -> Range {
        if self.width() > reference.width() {
            return Range::new(
                self.start.clamp(reference.start, reference.end),
                self.end.clamp(reference.start, reference.end),
            );
        }

        let overflow = if self.start < reference.start {
            reference.start - self.start
        } else if self.end > reference.end {
            reference.end - self.end
        } else {
            0.0
        };

        self.translated(overflow)
    }
}
