//! Configuration loading and management for the Payroll Engine.
//!
//! This module loads engine-wide settings from YAML: tenant defaults
//! (break time, average days per month, weekly rule switches, TDS rate),
//! cache TTLs, background task retry bounds and the tenant recovery window.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded config: {}", config.config().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CacheConfig, EngineConfig, TaskConfig, TenancyConfig, TenantDefaults};
