//! Cash advances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use super::PayrollEngine;
use crate::calculation::outstanding_balance;
use crate::error::{EngineError, EngineResult};
use crate::models::{AdvanceLedger, TenantId};

impl PayrollEngine {
    /// Records a cash advance to an employee.
    pub fn create_advance(
        &self,
        tenant_id: TenantId,
        employee_id: &str,
        amount: Decimal,
        advance_date: NaiveDate,
    ) -> EngineResult<AdvanceLedger> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::invalid_input("amount", "must be positive"));
        }
        let advance = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            t.employee_by_code(tenant_id, employee_id)?;
            let advance = AdvanceLedger::new(tenant_id, employee_id, amount.round_dp(2), advance_date);
            t.advances.insert(advance.id, advance.clone());
            Ok(advance)
        })?;
        info!(
            tenant_id = %tenant_id,
            employee_id,
            amount = %advance.amount,
            "advance recorded"
        );
        Ok(advance)
    }

    /// An employee's advances, oldest first.
    pub fn advances(&self, tenant_id: TenantId, employee_id: &str) -> EngineResult<Vec<AdvanceLedger>> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            let mut advances = t.advances_of(tenant_id, employee_id);
            advances.sort_by_key(|a| (a.advance_date, a.id));
            Ok(advances)
        })?
    }

    /// Sum of remaining balances of an employee's open advances.
    pub fn advance_balance(&self, tenant_id: TenantId, employee_id: &str) -> EngineResult<Decimal> {
        Ok(outstanding_balance(&self.advances(tenant_id, employee_id)?))
    }
}
