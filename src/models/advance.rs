//! Cash-advance ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;

/// Repayment state of an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceStatus {
    /// Nothing repaid yet.
    Pending,
    /// Some of the advance repaid.
    PartiallyPaid,
    /// Fully repaid.
    Repaid,
}

/// A cash advance given to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceLedger {
    /// Row identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee code.
    pub employee_id: String,
    /// Amount advanced.
    pub amount: Decimal,
    /// Date the advance was given. Repayment runs oldest first.
    pub advance_date: NaiveDate,
    /// Amount still owed.
    pub remaining_balance: Decimal,
    /// Repayment state.
    pub status: AdvanceStatus,
}

impl AdvanceLedger {
    /// Creates a pending advance.
    pub fn new(
        tenant_id: TenantId,
        employee_id: impl Into<String>,
        amount: Decimal,
        advance_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            employee_id: employee_id.into(),
            amount,
            advance_date,
            remaining_balance: amount,
            status: AdvanceStatus::Pending,
        }
    }

    /// Returns true while something is still owed.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self.status,
            AdvanceStatus::Pending | AdvanceStatus::PartiallyPaid
        ) && self.remaining_balance > Decimal::ZERO
    }

    /// Applies up to `amount` against the remaining balance.
    ///
    /// Returns the part of `amount` that was consumed.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{AdvanceLedger, AdvanceStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let mut advance = AdvanceLedger::new(
    ///     Uuid::new_v4(),
    ///     "ENG-ASH-001",
    ///     Decimal::from(5000),
    ///     NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    /// );
    /// assert_eq!(advance.repay(Decimal::from(2000)), Decimal::from(2000));
    /// assert_eq!(advance.status, AdvanceStatus::PartiallyPaid);
    /// assert_eq!(advance.repay(Decimal::from(4000)), Decimal::from(3000));
    /// assert_eq!(advance.status, AdvanceStatus::Repaid);
    /// ```
    pub fn repay(&mut self, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO || !self.is_outstanding() {
            return Decimal::ZERO;
        }
        let consumed = amount.min(self.remaining_balance);
        self.remaining_balance -= consumed;
        self.status = if self.remaining_balance.is_zero() {
            AdvanceStatus::Repaid
        } else {
            AdvanceStatus::PartiallyPaid
        };
        consumed
    }
}
