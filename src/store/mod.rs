//! In-process transactional row store.
//!
//! All tables sit behind one reader/writer lock. A [`Store::write`] closure
//! is a serialized transaction: no other reader or writer observes its
//! intermediate state.
//!
//! Writes are not rolled back. Mutations made before a closure returns
//! `Err` stay applied, so every closure must finish its validation and
//! lookups before its first mutation.

mod tables;

use std::sync::RwLock;

pub use tables::{DailyKey, PeriodKey, Tables};

use crate::error::{EngineError, EngineResult};

/// Shared store of every engine table.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with shared access to the tables.
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> EngineResult<T> {
        let tables = self.tables.read().map_err(|_| EngineError::Storage {
            message: "store lock poisoned".to_string(),
        })?;
        Ok(f(&tables))
    }

    /// Runs `f` as an exclusive transaction.
    ///
    /// `f` must not mutate before it can no longer fail: an `Err` is
    /// returned as is, with no rollback of earlier changes.
    pub fn write<T>(&self, f: impl FnOnce(&mut Tables) -> EngineResult<T>) -> EngineResult<T> {
        let mut tables = self.tables.write().map_err(|_| EngineError::Storage {
            message: "store lock poisoned".to_string(),
        })?;
        f(&mut tables)
    }
}
