//! Oldest-first repayment of cash advances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AdvanceLedger;

/// What a repayment did to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    /// Amount applied against advances.
    pub applied: Decimal,
    /// Amount left over once every advance was repaid.
    pub unapplied: Decimal,
    /// Advances whose balance changed, in the order they were repaid.
    pub touched: Vec<Uuid>,
}

/// Sum of the remaining balance over outstanding advances.
pub fn outstanding_balance<'a>(advances: impl IntoIterator<Item = &'a AdvanceLedger>) -> Decimal {
    advances
        .into_iter()
        .filter(|a| a.is_outstanding())
        .map(|a| a.remaining_balance)
        .sum()
}

/// Applies `amount` to `advances`, oldest advance date first.
///
/// Each advance is repaid fully before the next one is touched. Balances
/// never go below zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::apply_repayment;
/// use payroll_engine::models::{AdvanceLedger, AdvanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let tenant = Uuid::new_v4();
/// let mut advances = vec![
///     AdvanceLedger::new(tenant, "ENG-ASH-001", Decimal::from(3000), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
///     AdvanceLedger::new(tenant, "ENG-ASH-001", Decimal::from(1000), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
/// ];
///
/// let outcome = apply_repayment(&mut advances, Decimal::from(2500));
/// assert_eq!(outcome.applied, Decimal::from(2500));
/// assert_eq!(advances[0].status, AdvanceStatus::Repaid);
/// assert_eq!(advances[1].remaining_balance, Decimal::from(1500));
/// ```
pub fn apply_repayment(advances: &mut [AdvanceLedger], amount: Decimal) -> RepaymentOutcome {
    advances.sort_by(|a, b| a.advance_date.cmp(&b.advance_date));

    let mut outcome = RepaymentOutcome::default();
    let mut left = amount.max(Decimal::ZERO);
    for advance in advances.iter_mut() {
        if left.is_zero() {
            break;
        }
        let consumed = advance.repay(left);
        if consumed > Decimal::ZERO {
            left -= consumed;
            outcome.applied += consumed;
            outcome.touched.push(advance.id);
        }
    }
    outcome.unapplied = left;
    outcome
}
