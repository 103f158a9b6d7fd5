use crate::{
    FocusRange, FocusRangeCommand, FocusRangeError, FocusRangeStore, Range, Sequence,
    SheetAddress, TempTransaction, UnitPosition, UnitScale,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbEdge {
    Start,
    End,
}

/// What a drag gesture edits, decided once at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// Resize one edge of the range; the other edge stays put.
    Thumb(ThumbEdge),
    /// Move the whole range, preserving its width within the sequence.
    Strip,
    /// Grow a new range rightward from `origin`.
    Create { origin: UnitPosition },
}

#[derive(Debug)]
enum DragState {
    Idle,
    Dragging {
        snapshot: FocusRange,
        did_move: bool,
        staged: Option<TempTransaction>,
    },
}

/// One pointer-drag gesture editing a sheet's focus range.
///
/// Pixel deltas are converted to unit time, combined with the snapshot taken
/// at gesture start, and staged as a temp transaction on every move. The
/// previous staged edit is discarded before the next one is applied, so the
/// store never holds more than one outstanding edit per gesture. Releasing
/// the pointer commits the last staged edit, or discards it when the pointer
/// never moved.
#[derive(Debug)]
pub struct FocusRangeDrag {
    address: SheetAddress,
    sequence: Sequence,
    scale: UnitScale,
    kind: GestureKind,
    state: DragState,
}

impl FocusRangeDrag {
    pub fn new(
        address: SheetAddress,
        sequence: Sequence,
        scale: UnitScale,
        kind: GestureKind,
    ) -> Self {
        Self {
            address,
            sequence,
            scale,
            kind,
            state: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Captures the pre-drag snapshot and arms the gesture.
    ///
    /// A creation gesture commits its zero-width seed range right away; the
    /// other kinds touch the store only once the pointer moves.
    pub fn drag_start(&mut self, store: &mut FocusRangeStore) -> Result<(), FocusRangeError> {
        if self.is_dragging() {
            return Err(FocusRangeError::GestureInProgress);
        }

        let existing = store.focus_range(&self.address).copied();
        let snapshot = match self.kind {
            GestureKind::Thumb(_) => existing.unwrap_or(FocusRange {
                range: Range::new(0.0, self.sequence.length),
                enabled: false,
            }),
            GestureKind::Strip => match existing {
                Some(state) if state.enabled => state,
                _ => {
                    return Err(FocusRangeError::InvalidGesture(
                        "strip drag without an enabled focus range",
                    ))
                }
            },
            GestureKind::Create { origin } => {
                if origin < 0.0 || origin > self.sequence.length {
                    return Err(FocusRangeError::InvalidGesture(
                        "creation origin outside the sequence",
                    ));
                }
                let seed = FocusRange {
                    range: Range::new(origin, origin),
                    enabled: true,
                };
                let transaction = store.temp_transaction(FocusRangeCommand::Set {
                    address: self.address.clone(),
                    state: seed,
                })?;
                transaction.commit(store);
                seed
            }
        };

        self.state = DragState::Dragging {
            snapshot,
            did_move: false,
            staged: None,
        };
        Ok(())
    }

    /// Stages the candidate range for the pointer's current position.
    pub fn drag(
        &mut self,
        store: &mut FocusRangeStore,
        dx_pixels: f64,
    ) -> Result<(), FocusRangeError> {
        let DragState::Dragging {
            snapshot,
            did_move,
            staged,
        } = &mut self.state
        else {
            return Err(FocusRangeError::NoActiveGesture);
        };
        let snapshot = *snapshot;

        let delta = self.scale.to_unit_space(dx_pixels);
        let length = self.sequence.length;

        let state = match self.kind {
            GestureKind::Thumb(ThumbEdge::Start) => {
                let new_start = (snapshot.range.start + delta).clamp(0.0, snapshot.range.end);
                let snapped = self
                    .sequence
                    .closest_grid_position(new_start)
                    .clamp(0.0, snapshot.range.end);
                FocusRange {
                    range: Range::new(snapped, snapshot.range.end),
                    enabled: snapshot.enabled,
                }
            }
            GestureKind::Thumb(ThumbEdge::End) => {
                let new_end = (snapshot.range.end + delta).clamp(snapshot.range.start, length);
                let snapped = self
                    .sequence
                    .closest_grid_position(new_end)
                    .clamp(snapshot.range.start, length);
                FocusRange {
                    range: Range::new(snapshot.range.start, snapped),
                    enabled: snapshot.enabled,
                }
            }
            GestureKind::Strip => {
                let start = snapshot.range.start + delta;
                let mut end = snapshot.range.end + delta;
                // Inverted only via external manipulation of the store.
                if end < start {
                    end = start;
                }
                let shifted = Range::new(start, end).clamp_to(&Range::new(0.0, length));
                FocusRange {
                    range: Range::new(
                        self.sequence.closest_grid_position(shifted.start),
                        self.sequence.closest_grid_position(shifted.end),
                    ),
                    enabled: snapshot.enabled,
                }
            }
            GestureKind::Create { origin } => {
                let end = (origin + delta).clamp(origin, length);
                FocusRange {
                    range: Range::new(
                        self.sequence.closest_grid_position(origin),
                        self.sequence.closest_grid_position(end),
                    ),
                    enabled: true,
                }
            }
        };

        *did_move = true;
        // At most one staged edit may be outstanding at any time.
        if let Some(previous) = staged.take() {
            previous.discard(store);
        }
        *staged = Some(store.temp_transaction(FocusRangeCommand::Set {
            address: self.address.clone(),
            state,
        })?);
        Ok(())
    }

    /// Ends the gesture. Commits the staged edit if the pointer moved,
    /// discards it otherwise. Returns whether a commit happened.
    pub fn drag_end(&mut self, store: &mut FocusRangeStore) -> Result<bool, FocusRangeError> {
        let DragState::Dragging { did_move, staged, .. } = &mut self.state else {
            return Err(FocusRangeError::NoActiveGesture);
        };

        let committed = match (staged.take(), *did_move) {
            (Some(transaction), true) => {
                transaction.commit(store);
                true
            }
            (Some(transaction), false) => {
                transaction.discard(store);
                false
            }
            (None, _) => false,
        };

        self.state = DragState::Idle;
        Ok(committed)
    }
}
