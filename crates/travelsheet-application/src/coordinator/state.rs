use std::collections::HashMap;
use travelsheet_core::model::SheetKind;

/// Where a record stands relative to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Matches the last known remote state.
    #[default]
    Clean,
    /// Edited locally, not yet sent.
    PendingLocal,
    /// Write sent, awaiting the response.
    InFlight,
    /// The write failed and the local edit was reverted.
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub sheet: SheetKind,
    pub id: String,
}

impl RecordKey {
    pub fn new(sheet: SheetKind, id: impl Into<String>) -> Self {
        Self {
            sheet,
            id: id.into(),
        }
    }
}

/// Per-record sync states. Records never mutated are implicitly `Clean`.
#[derive(Debug, Default)]
pub(crate) struct SyncStates {
    states: HashMap<RecordKey, SyncState>,
}

impl SyncStates {
    pub fn get(&self, key: &RecordKey) -> SyncState {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: RecordKey, state: SyncState) {
        tracing::debug!("[Coordinator] {:?} {} -> {:?}", key.sheet, key.id, state);
        if state == SyncState::Clean {
            self.states.remove(&key);
        } else {
            self.states.insert(key, state);
        }
    }

    pub fn forget(&mut self, key: &RecordKey) {
        self.states.remove(key);
    }
}
