//! Property tests for the calculation layer.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::calculation::{
    AttendancePeriod, AttendanceSources, SalaryInputs, apply_repayment, calculate_salary,
    count_working_days, month_bounds, reconcile_attendance, weekly_penalty_days,
};
use payroll_engine::models::{
    AdvanceLedger, AdvanceStatus, AttendanceStatus, DailyAttendanceRecord, Employee, Holiday,
    WeeklyRuleSettings,
};

fn employee(tenant: Uuid) -> Employee {
    Employee::new(tenant, Some("ENG-ASH-001".into()), "Asha", "Rao")
}

fn penalty_rules(threshold: u32) -> WeeklyRuleSettings {
    WeeklyRuleSettings {
        penalty_enabled: true,
        absent_threshold: threshold,
        bonus_enabled: false,
    }
}

proptest! {
    #[test]
    fn prop_doj_at_month_start_changes_nothing(year in 2000i32..2040, month in 1u32..=12) {
        let tenant = Uuid::new_v4();
        let (start, end) = month_bounds(year, month).unwrap();
        let plain = employee(tenant);
        let joined = Employee { date_of_joining: Some(start), ..employee(tenant) };
        let later = Employee { date_of_joining: Some(end + Duration::days(1)), ..employee(tenant) };

        prop_assert_eq!(
            count_working_days(&plain, start, end, &[]),
            count_working_days(&joined, start, end, &[])
        );
        prop_assert_eq!(count_working_days(&later, start, end, &[]).net, 0);
    }

    #[test]
    fn prop_company_holiday_moves_one_day(day in 1u32..=30) {
        let tenant = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        prop_assume!(date.weekday() != Weekday::Sun);
        let employee = employee(tenant);
        let rules = WeeklyRuleSettings::default();
        let period = AttendancePeriod::month(2025, 6);
        let holidays = vec![Holiday::company_wide(tenant, date, "Holiday")];

        let before = reconcile_attendance(&employee, &rules, &[], &period, AttendanceSources::default()).unwrap();
        let after = reconcile_attendance(&employee, &rules, &holidays, &period, AttendanceSources::default()).unwrap();

        prop_assert_eq!(after.total_working_days, before.total_working_days - Decimal::ONE);
        prop_assert_eq!(after.holiday_days, before.holiday_days + Decimal::ONE);
        prop_assert_eq!(after.present_days, after.holiday_days);
        prop_assert_eq!(after.absent_days, Decimal::ZERO);
    }

    #[test]
    fn prop_penalty_is_one_per_week_at_most(threshold in 1u32..=6, absent in 0u32..=6) {
        let tenant = Uuid::new_v4();
        // 2025-06-02 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let records: Vec<_> = (0..absent)
            .map(|i| {
                DailyAttendanceRecord::new(
                    tenant,
                    "ENG-ASH-001",
                    monday + Duration::days(i64::from(i)),
                    AttendanceStatus::Absent,
                )
            })
            .collect();
        let (start, end) = month_bounds(2025, 6).unwrap();

        let penalty = weekly_penalty_days(&records, &penalty_rules(threshold), true, start, end);
        prop_assert_eq!(penalty, u32::from(absent >= threshold));
    }

    #[test]
    fn prop_ignored_absences_never_penalise(absent in 1u32..=6) {
        let tenant = Uuid::new_v4();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let records: Vec<_> = (0..absent)
            .map(|i| DailyAttendanceRecord {
                penalty_ignored: true,
                ..DailyAttendanceRecord::new(
                    tenant,
                    "ENG-ASH-001",
                    monday + Duration::days(i64::from(i)),
                    AttendanceStatus::Absent,
                )
            })
            .collect();
        let (start, end) = month_bounds(2025, 6).unwrap();

        prop_assert_eq!(weekly_penalty_days(&records, &penalty_rules(1), true, start, end), 0);
    }

    #[test]
    fn prop_repayment_clears_oldest_first(
        first in 1u32..5000,
        second in 2u32..5000,
        into_second in 1u32..5000,
    ) {
        prop_assume!(into_second < second);
        let tenant = Uuid::new_v4();
        let t1 = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let t2 = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut advances = vec![
            AdvanceLedger::new(tenant, "ENG-ASH-001", Decimal::from(second), t2),
            AdvanceLedger::new(tenant, "ENG-ASH-001", Decimal::from(first), t1),
        ];

        let outcome = apply_repayment(&mut advances, Decimal::from(first + into_second));

        prop_assert_eq!(outcome.unapplied, Decimal::ZERO);
        prop_assert_eq!(advances[0].advance_date, t1);
        prop_assert_eq!(advances[0].status, AdvanceStatus::Repaid);
        prop_assert_eq!(advances[0].remaining_balance, Decimal::ZERO);
        prop_assert_eq!(advances[1].status, AdvanceStatus::PartiallyPaid);
        prop_assert_eq!(advances[1].remaining_balance, Decimal::from(second - into_second));
    }

    #[test]
    fn prop_salary_never_negative(
        basic in 0u32..200_000,
        present in 0u32..31,
        late_minutes in 0u32..20_000,
        tds in 0u32..=30,
        advance in 0u32..100_000,
    ) {
        let breakdown = calculate_salary(&SalaryInputs {
            basic_salary: Decimal::from(basic),
            shift_hours_per_day: Decimal::new(85, 1),
            total_working_days: Decimal::from(25),
            present_days: Decimal::from(present),
            holiday_days: Decimal::ZERO,
            ot_hours: Decimal::ZERO,
            ot_rate_per_hour: Decimal::ZERO,
            late_minutes,
            tds_percentage: Decimal::from(tds),
            advance_balance: Decimal::from(advance),
        });

        prop_assert!(breakdown.gross_salary >= Decimal::ZERO);
        prop_assert!(breakdown.net_payable >= Decimal::ZERO);
        prop_assert!(breakdown.advance_deduction <= Decimal::from(advance));
        prop_assert!(breakdown.salary_for_present_days <= Decimal::from(basic));
    }
}
