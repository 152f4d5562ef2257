//! Tenant holiday calendar.
//!
//! Holidays reduce the working-day denominator and are paid as present days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;

/// A tenant holiday, company-wide or limited to some departments.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Holiday;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let mut holiday = Holiday::company_wide(
///     Uuid::new_v4(),
///     NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
///     "Independence Day",
/// );
/// assert!(holiday.applies_to(Some("Sales")));
///
/// holiday.applies_to_all = false;
/// holiday.specific_departments = "Engineering, Ops".to_string();
/// assert!(holiday.applies_to(Some("ops")));
/// assert!(!holiday.applies_to(Some("Sales")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Row identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Date of the holiday.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Applies to every department.
    pub applies_to_all: bool,
    /// Comma-separated departments, used when `applies_to_all` is false.
    #[serde(default)]
    pub specific_departments: String,
    /// Inactive holidays are ignored.
    pub is_active: bool,
}

impl Holiday {
    /// Creates an active holiday that applies to every department.
    pub fn company_wide(tenant_id: TenantId, date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            date,
            name: name.into(),
            applies_to_all: true,
            specific_departments: String::new(),
            is_active: true,
        }
    }

    /// Returns true if the holiday is active and covers `department`.
    ///
    /// Department matching is case-insensitive and ignores surrounding
    /// whitespace. Employees without a department only get company-wide
    /// holidays.
    pub fn applies_to(&self, department: Option<&str>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.applies_to_all {
            return true;
        }
        let Some(department) = department.map(str::trim).filter(|d| !d.is_empty()) else {
            return false;
        };
        self.specific_departments
            .split(',')
            .map(str::trim)
            .any(|listed| listed.eq_ignore_ascii_case(department))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department_holiday(departments: &str) -> Holiday {
        Holiday {
            applies_to_all: false,
            specific_departments: departments.to_string(),
            ..Holiday::company_wide(
                Uuid::new_v4(),
                NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
                "Pongal",
            )
        }
    }

    #[test]
    fn test_inactive_holiday_never_applies() {
        let mut holiday = department_holiday("");
        holiday.applies_to_all = true;
        holiday.is_active = false;
        assert!(!holiday.applies_to(Some("Engineering")));
    }

    #[test]
    fn test_department_list_matching() {
        let holiday = department_holiday(" Engineering ,Ops");
        assert!(holiday.applies_to(Some("engineering")));
        assert!(holiday.applies_to(Some(" OPS ")));
        assert!(!holiday.applies_to(Some("Eng")));
    }

    #[test]
    fn test_no_department_only_gets_company_wide() {
        let holiday = department_holiday("Engineering");
        assert!(!holiday.applies_to(None));
        assert!(!holiday.applies_to(Some("")));
    }
}
