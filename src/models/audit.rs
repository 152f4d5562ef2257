//! Audit trail of a salary calculation.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a formula.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "payable_base_days".to_string(),
///     rule_name: "Payable Base Days".to_string(),
///     input: serde_json::json!({"total_working_days": "25", "holiday_days": "1"}),
///     output: serde_json::json!({"payable_base_days": "26"}),
///     reasoning: "25 working days + 1 holiday = 26".to_string(),
/// };
/// assert_eq!(step.rule_id, "payable_base_days");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the formula that was applied.
    pub rule_id: String,
    /// The human-readable name of the formula.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the result.
    pub reasoning: String,
}
