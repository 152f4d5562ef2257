//! Multi-tenant attendance reconciliation and payroll engine.
//!
//! This crate records daily attendance, rolls it up into monthly summaries
//! with weekly absence penalties and Sunday bonuses, reconciles it with
//! uploaded spreadsheets, and calculates monthly salaries with overtime,
//! late deductions, TDS and advance repayment.

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod tasks;
