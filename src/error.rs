//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while recording attendance,
//! reconciling it and calculating salaries.
//!
//! Errors fall into four families that callers can test for:
//! validation ([`EngineError::is_validation`]), missing rows
//! ([`EngineError::is_not_found`]), lock conflicts
//! ([`EngineError::is_locked`]) and infrastructure failures.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the Payroll Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The tenant does not exist (or has been purged).
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound {
        /// The tenant that was requested.
        tenant_id: Uuid,
    },

    /// A tenant-scoped row was not found.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of row (e.g. "Employee", "CalculatedSalary").
        entity: String,
        /// The key that was looked up.
        key: String,
    },

    /// The payroll period is locked against recalculation.
    #[error("Payroll period {year}-{month:02} is locked")]
    PeriodLocked {
        /// The period year.
        year: i32,
        /// The period month (1-12).
        month: u32,
    },

    /// The salary row has already been paid.
    #[error("Salary for employee '{employee_id}' in {year}-{month:02} is already paid")]
    SalaryAlreadyPaid {
        /// The employee code.
        employee_id: String,
        /// The period year.
        year: i32,
        /// The period month (1-12).
        month: u32,
    },

    /// The tenant was deleted longer ago than the recovery window allows.
    #[error("Recovery window for tenant {tenant_id} has expired")]
    RecoveryWindowExpired {
        /// The tenant that can no longer be recovered.
        tenant_id: Uuid,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A caller supplied an invalid value.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// The tenant does not hold enough credits for the deduction.
    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits {
        /// Credits requested.
        required: i64,
        /// Credits held by the tenant.
        available: i64,
    },

    /// The backing store could not be accessed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A cache operation failed.
    #[error("Cache error: {message}")]
    Cache {
        /// A description of the cache failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::NotFound`] for the given entity and key.
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    /// Builds an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Returns true when the error reports a missing row or tenant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound { .. } | EngineError::TenantNotFound { .. }
        )
    }

    /// Returns true when the error reports a lock conflict.
    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            EngineError::PeriodLocked { .. }
                | EngineError::SalaryAlreadyPaid { .. }
                | EngineError::RecoveryWindowExpired { .. }
        )
    }

    /// Returns true when the error reports rejected input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidEmployee { .. }
                | EngineError::InvalidInput { .. }
                | EngineError::InsufficientCredits { .. }
        )
    }
}

/// Formats a decimal amount for error messages without trailing zeros.
pub(crate) fn display_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
