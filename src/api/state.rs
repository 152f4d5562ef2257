//! Application state for the Payroll Engine API.

use crate::config::ConfigLoader;
use crate::services::PayrollEngine;

/// Shared application state.
///
/// Holds the engine every handler works against. Cloning is cheap; clones
/// share the same store and cache.
#[derive(Clone, Debug)]
pub struct AppState {
    engine: PayrollEngine,
}

impl AppState {
    /// Creates a state around an existing engine.
    pub fn new(engine: PayrollEngine) -> Self {
        Self { engine }
    }

    /// Creates a state with a fresh engine built from a loaded configuration.
    ///
    /// Called inside a tokio runtime, the engine runs background tasks
    /// detached from the requests that trigger them.
    pub fn from_loader(loader: ConfigLoader) -> Self {
        Self::new(PayrollEngine::new(loader.into_config()))
    }

    /// Returns the engine.
    pub fn engine(&self) -> &PayrollEngine {
        &self.engine
    }
}
