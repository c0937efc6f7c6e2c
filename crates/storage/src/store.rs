use std::cell::RefCell;
use std::path::PathBuf;

use memoria_core::model::State;
use thiserror::Error;

/// Errors surfaced by state stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence boundary for the whole application state.
///
/// The engine treats the persisted form as an opaque blob: one `load` at
/// startup, one `save` at the end of every mutating operation. A failed save
/// leaves the in-memory state valid; durability for that operation is simply
/// lost.
pub trait StateStore {
    /// Loads the persisted state, or the default first-run state when
    /// nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if an existing blob cannot be read or decoded.
    fn load(&self) -> Result<State, StorageError>;

    /// Persists the given state, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the blob cannot be written.
    fn save(&self, state: &State) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RefCell<Option<State>>,
}

impl InMemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed saves is not tracked; this just exposes whether
    /// anything has been saved at all.
    #[must_use]
    pub fn has_saved(&self) -> bool {
        self.state.borrow().is_some()
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<State, StorageError> {
        Ok(self.state.borrow().clone().unwrap_or_default())
    }

    fn save(&self, state: &State) -> Result<(), StorageError> {
        *self.state.borrow_mut() = Some(state.clone());
        Ok(())
    }
}

//
// ─── JSON FILE STORE ───────────────────────────────────────────────────────────
//

/// File-backed store serializing the state as one JSON blob.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<State, StorageError> {
        if !self.path.exists() {
            log::debug!("no state blob at {}, using defaults", self.path.display());
            return Ok(State::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn save(&self, state: &State) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError::Io(e.to_string()))?;
        log::debug!("state saved to {}", self.path.display());
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
