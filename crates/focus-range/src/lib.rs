use serde::{Deserialize, Serialize};
use thiserror::Error;

mod drag;
pub use drag::*;
mod range;
pub use range::*;
mod sequence;
pub use sequence::*;
mod space;
pub use space::*;
mod store;
pub use store::*;

#[derive(Debug, Error)]
pub enum FocusRangeError {
    #[error("no focus range set for sheet {0}")]
    RangeNotFound(SheetAddress),
    #[error("invalid gesture: {0}")]
    InvalidGesture(&'static str),
    #[error("a drag gesture is already in progress")]
    GestureInProgress,
    #[error("no drag gesture in progress")]
    NoActiveGesture,
    #[error("history empty: {0}")]
    HistoryEmpty(&'static str),
}

/// Position in unit time: 0 is sequence start, `Sequence::length` is sequence end.
pub type UnitPosition = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}
