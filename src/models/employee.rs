//! Employee model and related types.
//!
//! This module defines the [`Employee`] struct and the [`WeeklyOffDays`]
//! schedule used by the working-day calculator and the weekly rules.

use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantId;

/// The days of the week an employee is not expected to work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyOffDays {
    /// Monday is an off day.
    #[serde(default)]
    pub monday: bool,
    /// Tuesday is an off day.
    #[serde(default)]
    pub tuesday: bool,
    /// Wednesday is an off day.
    #[serde(default)]
    pub wednesday: bool,
    /// Thursday is an off day.
    #[serde(default)]
    pub thursday: bool,
    /// Friday is an off day.
    #[serde(default)]
    pub friday: bool,
    /// Saturday is an off day.
    #[serde(default)]
    pub saturday: bool,
    /// Sunday is an off day.
    #[serde(default)]
    pub sunday: bool,
}

impl WeeklyOffDays {
    /// No off days at all.
    pub const NONE: WeeklyOffDays = WeeklyOffDays {
        monday: false,
        tuesday: false,
        wednesday: false,
        thursday: false,
        friday: false,
        saturday: false,
        sunday: false,
    };

    /// Only Sunday off.
    pub const SUNDAY: WeeklyOffDays = WeeklyOffDays {
        sunday: true,
        ..WeeklyOffDays::NONE
    };

    /// Returns true if `weekday` is flagged as an off day.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::WeeklyOffDays;
    /// use chrono::Weekday;
    ///
    /// assert!(WeeklyOffDays::SUNDAY.is_off(Weekday::Sun));
    /// assert!(!WeeklyOffDays::SUNDAY.is_off(Weekday::Mon));
    /// ```
    pub fn is_off(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Off days in Monday-to-Sunday order.
    pub fn off_weekdays(&self) -> Vec<Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(|day| self.is_off(*day))
        .collect()
    }

    /// Returns true if at least one off day is configured.
    pub fn has_any(&self) -> bool {
        !self.off_weekdays().is_empty()
    }
}

/// An employee of a tenant together with their compensation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Row identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tenant-scoped employee code. Rows without one are skipped by payroll.
    pub employee_id: Option<String>,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Department, used for department-specific holidays and reports.
    #[serde(default)]
    pub department: Option<String>,
    /// Date of joining. Days before it are never working days.
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Shift start time.
    pub shift_start_time: NaiveTime,
    /// Shift end time. Earlier than the start means the shift ends next day.
    pub shift_end_time: NaiveTime,
    /// Weekly off days.
    #[serde(default)]
    pub off_days: WeeklyOffDays,
    /// Overtime rate per hour; derived once at creation when absent.
    #[serde(default)]
    pub ot_charge_per_hour: Option<Decimal>,
    /// Employee-specific TDS percentage overriding the period rate.
    #[serde(default)]
    pub tds_percentage: Option<Decimal>,
    /// Employee-level switch for the tenant weekly rules.
    pub weekly_rules_enabled: bool,
    /// Whether the employee is active.
    pub is_active: bool,
    /// When the employee was marked inactive.
    #[serde(default)]
    pub inactive_marked_at: Option<NaiveDate>,
}

impl Employee {
    /// Creates an active employee on a 09:00-18:00 shift with Sunday off.
    pub fn new(
        tenant_id: TenantId,
        employee_id: Option<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            employee_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            department: None,
            date_of_joining: None,
            basic_salary: Decimal::ZERO,
            shift_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            shift_end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            off_days: WeeklyOffDays::SUNDAY,
            ot_charge_per_hour: None,
            tds_percentage: None,
            weekly_rules_enabled: true,
            is_active: true,
            inactive_marked_at: None,
        }
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The employee code, if one has been assigned and is not blank.
    pub fn code(&self) -> Option<&str> {
        self.employee_id
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Paid hours per shift: shift length minus the tenant break time.
    ///
    /// Shifts ending at or before their start time wrap past midnight.
    /// The result is never negative.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let employee = Employee::new(Uuid::new_v4(), None, "Asha", "Rao");
    /// // 09:00-18:00 less a half-hour break
    /// assert_eq!(employee.shift_hours_per_day(Decimal::new(5, 1)), Decimal::new(85, 1));
    /// ```
    pub fn shift_hours_per_day(&self, break_time: Decimal) -> Decimal {
        let mut minutes = (self.shift_end_time - self.shift_start_time).num_minutes();
        if minutes <= 0 {
            minutes += 24 * 60;
        }
        let hours = Decimal::from(minutes) / Decimal::from(60);
        (hours - break_time).max(Decimal::ZERO)
    }

    /// Derives the OT rate from the basic salary.
    ///
    /// `basic_salary / (shift_hours_per_day × average_days_per_month)`,
    /// rounded to two decimal places. Returns `None` when either factor is zero.
    pub fn derive_ot_rate(
        &self,
        break_time: Decimal,
        average_days_per_month: Decimal,
    ) -> Option<Decimal> {
        let denominator = self.shift_hours_per_day(break_time) * average_days_per_month;
        if denominator <= Decimal::ZERO {
            return None;
        }
        Some((self.basic_salary / denominator).round_dp(2))
    }

    /// The static OT rate, or a freshly derived one when none is stored.
    pub fn effective_ot_rate(
        &self,
        break_time: Decimal,
        average_days_per_month: Decimal,
    ) -> Decimal {
        self.ot_charge_per_hour
            .or_else(|| self.derive_ot_rate(break_time, average_days_per_month))
            .unwrap_or(Decimal::ZERO)
    }

    /// Stores a derived OT rate unless one is already set.
    ///
    /// Returns true if the rate was filled in.
    pub fn ensure_ot_rate(&mut self, break_time: Decimal, average_days_per_month: Decimal) -> bool {
        if self.ot_charge_per_hour.is_some() {
            return false;
        }
        self.ot_charge_per_hour = self.derive_ot_rate(break_time, average_days_per_month);
        self.ot_charge_per_hour.is_some()
    }

    /// Returns true if the employee had joined by `date`.
    pub fn has_joined_by(&self, date: NaiveDate) -> bool {
        self.date_of_joining.is_none_or(|doj| doj <= date)
    }

    /// Returns true if the employee should be considered for a period
    /// starting on `period_start`.
    ///
    /// Inactive employees stay payable for periods that began before they
    /// were marked inactive.
    pub fn is_payable_for(&self, period_start: NaiveDate) -> bool {
        if self.is_active {
            return true;
        }
        self.inactive_marked_at
            .is_some_and(|marked| marked >= period_start)
    }
}
