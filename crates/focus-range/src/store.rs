use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use uuid::Uuid;

use crate::{FocusRangeError, Range};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SheetId(pub String);

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the sheet a focus range belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SheetAddress {
    pub project_id: ProjectId,
    pub sheet_id: SheetId,
}

impl SheetAddress {
    pub fn new(project_id: impl Into<String>, sheet_id: impl Into<String>) -> Self {
        Self {
            project_id: ProjectId(project_id.into()),
            sheet_id: SheetId(sheet_id.into()),
        }
    }
}

impl fmt::Display for SheetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.sheet_id)
    }
}

/// The user-enabled sub-interval of a sequence used to restrict playback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FocusRange {
    pub range: Range,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EditId(pub Uuid);

impl EditId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EditId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FocusRangeCommand {
    Set {
        address: SheetAddress,
        state: FocusRange,
    },
    Unset {
        address: SheetAddress,
    },
}

/// A committed edit, kept for undo/redo. `inverse` reverts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommittedEdit {
    pub id: EditId,
    pub inverse: FocusRangeCommand,
    /// Commit timestamp, epoch milliseconds.
    pub committed_at: i64,
}

/// Applies a command to the store, returning the command that reverts it.
pub fn apply_command(
    store: &mut FocusRangeStore,
    command: FocusRangeCommand,
) -> Result<FocusRangeCommand, FocusRangeError> {
    match command {
        FocusRangeCommand::Set { address, state } => {
            let previous = store
                .entries
                .entry(address.project_id.clone())
                .or_default()
                .insert(address.sheet_id.clone(), state);
            Ok(match previous {
                Some(state) => FocusRangeCommand::Set { address, state },
                None => FocusRangeCommand::Unset { address },
            })
        }
        FocusRangeCommand::Unset { address } => {
            let sheets = store
                .entries
                .get_mut(&address.project_id)
                .ok_or_else(|| FocusRangeError::RangeNotFound(address.clone()))?;
            let state = sheets
                .remove(&address.sheet_id)
                .ok_or_else(|| FocusRangeError::RangeNotFound(address.clone()))?;
            if sheets.is_empty() {
                store.entries.remove(&address.project_id);
            }
            Ok(FocusRangeCommand::Set { address, state })
        }
    }
}

/// An applied but uncommitted store mutation.
///
/// The mutation is already visible to point-in-time reads; `commit` makes it
/// durable, `discard` reverts it with no observable trace. Both consume the
/// handle, so a transaction cannot be resolved twice.
#[derive(Debug)]
pub struct TempTransaction {
    inverse: FocusRangeCommand,
}

impl TempTransaction {
    pub fn commit(self, store: &mut FocusRangeStore) {
        store.record_commit(self.inverse);
    }

    pub fn discard(self, store: &mut FocusRangeStore) {
        let reverted = apply_command(store, self.inverse);
        debug_assert!(
            reverted.is_ok(),
            "the inverse of an applied command must apply"
        );
    }
}

/// Focus ranges for all sheets, keyed by project then sheet, with an edit
/// history and a revision counter bumped on every durable change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusRangeStore {
    entries: HashMap<ProjectId, HashMap<SheetId, FocusRange>>,
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    undo_stack: Vec<CommittedEdit>,
    #[serde(default)]
    redo_stack: Vec<CommittedEdit>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl FocusRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time read of a sheet's focus range.
    pub fn focus_range(&self, address: &SheetAddress) -> Option<&FocusRange> {
        self.entries
            .get(&address.project_id)
            .and_then(|sheets| sheets.get(&address.sheet_id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Committed edits, oldest first.
    pub fn undo_history(&self) -> &[CommittedEdit] {
        &self.undo_stack
    }

    /// Applies `command` and returns the uncommitted transaction handle.
    pub fn temp_transaction(
        &mut self,
        command: FocusRangeCommand,
    ) -> Result<TempTransaction, FocusRangeError> {
        let inverse = apply_command(self, command)?;
        Ok(TempTransaction { inverse })
    }

    /// Sets a sheet's focus range as a committed edit.
    pub fn set_focus_range(
        &mut self,
        address: SheetAddress,
        range: Range,
        enabled: bool,
    ) -> Result<(), FocusRangeError> {
        let transaction = self.temp_transaction(FocusRangeCommand::Set {
            address,
            state: FocusRange { range, enabled },
        })?;
        transaction.commit(self);
        Ok(())
    }

    /// Removes a sheet's focus range as a committed edit.
    pub fn delete_focus_range(&mut self, address: SheetAddress) -> Result<(), FocusRangeError> {
        let transaction = self.temp_transaction(FocusRangeCommand::Unset { address })?;
        transaction.commit(self);
        Ok(())
    }

    /// Flips a sheet's enabled flag as a committed edit. Returns the new flag.
    pub fn toggle_enabled(&mut self, address: SheetAddress) -> Result<bool, FocusRangeError> {
        let current = self
            .focus_range(&address)
            .copied()
            .ok_or_else(|| FocusRangeError::RangeNotFound(address.clone()))?;
        let enabled = !current.enabled;
        self.set_focus_range(address, current.range, enabled)?;
        Ok(enabled)
    }

    pub fn undo(&mut self) -> Result<(), FocusRangeError> {
        let edit = self
            .undo_stack
            .pop()
            .ok_or(FocusRangeError::HistoryEmpty("undo stack"))?;
        let inverse = apply_command(self, edit.inverse)?;
        self.revision += 1;
        self.redo_stack.push(CommittedEdit {
            id: EditId::new(),
            inverse,
            committed_at: chrono::Utc::now().timestamp_millis(),
        });
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), FocusRangeError> {
        let edit = self
            .redo_stack
            .pop()
            .ok_or(FocusRangeError::HistoryEmpty("redo stack"))?;
        let inverse = apply_command(self, edit.inverse)?;
        self.revision += 1;
        self.undo_stack.push(CommittedEdit {
            id: EditId::new(),
            inverse,
            committed_at: chrono::Utc::now().timestamp_millis(),
        });
        Ok(())
    }

    fn record_commit(&mut self, inverse: FocusRangeCommand) {
        self.revision += 1;
        self.undo_stack.push(CommittedEdit {
            id: EditId::new(),
            inverse,
            committed_at: chrono::Utc::now().timestamp_millis(),
        });
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> SheetAddress {
        SheetAddress::new("proj", "Scene")
    }

    fn state(start: f64, end: f64, enabled: bool) -> FocusRange {
        FocusRange {
            range: Range::new(start, end),
            enabled,
        }
    }

    #[test]
    fn test_apply_set_returns_inverse() {
        let mut store = FocusRangeStore::new();

        // First set: inverse is an unset.
        let inverse = apply_command(
            &mut store,
            FocusRangeCommand::Set {
                address: address(),
                state: state(1.0, 2.0, true),
            },
        )
        .unwrap();
        assert_eq!(
            inverse,
            FocusRangeCommand::Unset { address: address() }
        );
        assert_eq!(store.focus_range(&address()), Some(&state(1.0, 2.0, true)));

        // Overwrite: inverse restores the previous state.
        let inverse = apply_command(
            &mut store,
            FocusRangeCommand::Set {
                address: address(),
                state: state(3.0, 4.0, false),
            },
        )
        .unwrap();
        assert_eq!(
            inverse,
            FocusRangeCommand::Set {
                address: address(),
                state: state(1.0, 2.0, true),
            }
        );

        // Applying the inverse restores the overwritten state.
        apply_command(&mut store, inverse).unwrap();
        assert_eq!(store.focus_range(&address()), Some(&state(1.0, 2.0, true)));
    }

    #[test]
    fn test_unset_missing_range_fails() {
        let mut store = FocusRangeStore::new();
        let result = apply_command(&mut store, FocusRangeCommand::Unset { address: address() });
        assert!(matches!(result, Err(FocusRangeError::RangeNotFound(_))));
    }

    #[test]
    fn test_discard_leaves_no_trace() {
        let mut store = FocusRangeStore::new();
        store
            .set_focus_range(address(), Range::new(0.0, 5.0), true)
            .unwrap();
        let revision = store.revision();
        let undo_depth = store.undo_depth();

        let transaction = store
            .temp_transaction(FocusRangeCommand::Set {
                address: address(),
                state: state(2.0, 3.0, true),
            })
            .unwrap();
        // The staged state is visible to point-in-time reads.
        assert_eq!(store.focus_range(&address()), Some(&state(2.0, 3.0, true)));

        transaction.discard(&mut store);
        assert_eq!(store.focus_range(&address()), Some(&state(0.0, 5.0, true)));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.undo_depth(), undo_depth);
    }

    #[test]
    fn test_commit_is_durable_and_undoable() {
        let mut store = FocusRangeStore::new();
        store
            .set_focus_range(address(), Range::new(0.0, 5.0), true)
            .unwrap();

        let transaction = store
            .temp_transaction(FocusRangeCommand::Set {
                address: address(),
                state: state(1.0, 4.0, true),
            })
            .unwrap();
        transaction.commit(&mut store);

        assert_eq!(store.revision(), 2);
        assert_eq!(store.undo_depth(), 2);
        assert_eq!(store.focus_range(&address()), Some(&state(1.0, 4.0, true)));

        store.undo().unwrap();
        assert_eq!(store.focus_range(&address()), Some(&state(0.0, 5.0, true)));

        store.redo().unwrap();
        assert_eq!(store.focus_range(&address()), Some(&state(1.0, 4.0, true)));
    }

    #[test]
    fn test_undo_past_creation_removes_entry() {
        let mut store = FocusRangeStore::new();
        store
            .set_focus_range(address(), Range::new(0.0, 5.0), true)
            .unwrap();

        store.undo().unwrap();
        assert_eq!(store.focus_range(&address()), None);

        store.redo().unwrap();
        assert_eq!(store.focus_range(&address()), Some(&state(0.0, 5.0, true)));
    }

    #[test]
    fn test_empty_history_errors() {
        let mut store = FocusRangeStore::new();
        assert!(matches!(
            store.undo(),
            Err(FocusRangeError::HistoryEmpty("undo stack"))
        ));
        assert!(matches!(
            store.redo(),
            Err(FocusRangeError::HistoryEmpty("redo stack"))
        ));
    }

    #[test]
    fn test_toggle_enabled() {
        let mut store = FocusRangeStore::new();
        assert!(matches!(
            store.toggle_enabled(address()),
            Err(FocusRangeError::RangeNotFound(_))
        ));

        store
            .set_focus_range(address(), Range::new(0.0, 5.0), true)
            .unwrap();
        assert_eq!(store.toggle_enabled(address()).unwrap(), false);
        assert_eq!(store.focus_range(&address()), Some(&state(0.0, 5.0, false)));
        assert_eq!(store.toggle_enabled(address()).unwrap(), true);
    }

    #[test]
    fn test_delete_focus_range() {
        let mut store = FocusRangeStore::new();
        assert!(matches!(
            store.delete_focus_range(address()),
            Err(FocusRangeError::RangeNotFound(_))
        ));

        store
            .set_focus_range(address(), Range::new(0.0, 5.0), true)
            .unwrap();
        store.delete_focus_range(address()).unwrap();
        assert_eq!(store.focus_range(&address()), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = FocusRangeStore::new();
        store
            .set_focus_range(address(), Range::new(0.5, 4.25), true)
            .unwrap();
        store
            .set_focus_range(SheetAddress::new("proj", "Intro"), Range::new(0.0, 1.0), false)
            .unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let restored: FocusRangeStore = serde_json::from_str(&json).unwrap();

        assert_eq!(
            restored.focus_range(&address()),
            Some(&state(0.5, 4.25, true))
        );
        assert_eq!(restored.revision(), store.revision());
        assert_eq!(restored.undo_depth(), store.undo_depth());
    }
}
