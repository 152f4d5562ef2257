//! Holiday calendar maintenance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::PayrollEngine;
use crate::cache::CacheScope;
use crate::error::{EngineError, EngineResult};
use crate::models::{Holiday, TenantId};

const HOLIDAY_SCOPES: [CacheScope; 2] = [CacheScope::AttendanceRecords, CacheScope::Charts];

/// Input for [`PayrollEngine::add_holiday`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHoliday {
    /// The holiday date.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Departments the holiday is limited to. Empty means company-wide.
    #[serde(default)]
    pub departments: Vec<String>,
}

impl PayrollEngine {
    /// Adds a holiday.
    pub fn add_holiday(&self, tenant_id: TenantId, input: NewHoliday) -> EngineResult<Holiday> {
        if input.name.trim().is_empty() {
            return Err(EngineError::invalid_input("name", "holiday name is required"));
        }
        let departments: Vec<&str> = input
            .departments
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .collect();
        let holiday = Holiday {
            applies_to_all: departments.is_empty(),
            specific_departments: departments.join(","),
            ..Holiday::company_wide(tenant_id, input.date, input.name.trim())
        };

        let stored = holiday.clone();
        self.store().write(move |t| {
            t.active_tenant(tenant_id)?;
            t.holidays.insert(holiday.id, holiday);
            Ok(())
        })?;

        info!(tenant_id = %tenant_id, date = %stored.date, name = %stored.name, "holiday added");
        self.cache().invalidate(tenant_id, &HOLIDAY_SCOPES);
        Ok(stored)
    }

    /// Removes a holiday.
    pub fn remove_holiday(&self, tenant_id: TenantId, holiday_id: Uuid) -> EngineResult<Holiday> {
        let removed = self.store().write(|t| {
            t.active_tenant(tenant_id)?;
            if !t
                .holidays
                .get(&holiday_id)
                .is_some_and(|h| h.tenant_id == tenant_id)
            {
                return Err(EngineError::not_found("holiday", holiday_id));
            }
            t.holidays
                .remove(&holiday_id)
                .ok_or_else(|| EngineError::not_found("holiday", holiday_id))
        })?;

        info!(tenant_id = %tenant_id, date = %removed.date, "holiday removed");
        self.cache().invalidate(tenant_id, &HOLIDAY_SCOPES);
        Ok(removed)
    }

    /// The tenant's holidays, ordered by date.
    pub fn holidays(&self, tenant_id: TenantId) -> EngineResult<Vec<Holiday>> {
        self.store().read(|t| {
            t.active_tenant(tenant_id)?;
            let mut holidays = t.holidays_of(tenant_id);
            holidays.sort_by_key(|h| h.date);
            Ok(holidays)
        })?
    }
}
