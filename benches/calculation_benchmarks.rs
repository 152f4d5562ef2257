//! Performance benchmarks for the Payroll Engine.
//!
//! Covers the hot paths:
//! - Salary formulas for a single employee
//! - Reconciling a month of daily records
//! - A salary batch over 100 and 1000 employees
//! - The attendance report through the HTTP router, cold and cached
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::api::{create_router, AppState};
use payroll_engine::calculation::{
    calculate_salary, reconcile_attendance, AttendancePeriod, AttendanceSources, SalaryInputs,
};
use payroll_engine::config::{ConfigLoader, EngineConfig};
use payroll_engine::models::{
    AttendanceStatus, DailyAttendanceRecord, Employee, TenantId, WeeklyRuleSettings,
};
use payroll_engine::services::{NewEmployee, PayrollEngine};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn june_days() -> impl Iterator<Item = NaiveDate> {
    (1..=30)
        .filter_map(|d| NaiveDate::from_ymd_opt(2025, 6, d))
        .filter(|d| d.weekday() != Weekday::Sun)
}

fn status_for(index: usize, date: NaiveDate) -> AttendanceStatus {
    match (index + date.day() as usize) % 9 {
        0 => AttendanceStatus::Absent,
        1 => AttendanceStatus::HalfDay,
        _ => AttendanceStatus::Present,
    }
}

/// Creates an engine with `employees` staff, each with a month of records.
fn create_populated_engine(employees: usize) -> (PayrollEngine, TenantId) {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let engine = PayrollEngine::new(config.into_config());
    let tenant = engine.create_tenant("Bench Textiles").expect("tenant");
    for i in 0..employees {
        let employee = engine
            .create_employee(
                tenant.id,
                NewEmployee::new(format!("Worker{i}"), "Bench", Decimal::from(24000 + i as i64)),
            )
            .expect("employee");
        let code = employee.employee_id.expect("code");
        for date in june_days() {
            engine
                .record_daily_attendance(
                    tenant.id,
                    DailyAttendanceRecord::new(tenant.id, &code, date, status_for(i, date)),
                )
                .expect("attendance");
        }
    }
    (engine, tenant.id)
}

/// Benchmark: salary formulas for one employee.
fn bench_salary_formula(c: &mut Criterion) {
    let inputs = SalaryInputs {
        basic_salary: Decimal::from(30000),
        shift_hours_per_day: Decimal::new(85, 1),
        total_working_days: Decimal::from(25),
        present_days: Decimal::from(23),
        holiday_days: Decimal::ONE,
        ot_hours: Decimal::new(125, 1),
        ot_rate_per_hour: Decimal::new(11610, 2),
        late_minutes: 95,
        tds_percentage: Decimal::from(5),
        advance_balance: Decimal::from(2000),
    };

    c.bench_function("salary_formula", |b| {
        b.iter(|| black_box(calculate_salary(black_box(&inputs))))
    });
}

/// Benchmark: reconciling one month of daily records.
fn bench_reconcile_month(c: &mut Criterion) {
    let tenant = Uuid::new_v4();
    let employee = Employee::new(tenant, Some("ENG-BEN-001".into()), "Asha", "Bench");
    let records: Vec<_> = june_days()
        .map(|date| DailyAttendanceRecord::new(tenant, "ENG-BEN-001", date, status_for(0, date)))
        .collect();
    let rules = WeeklyRuleSettings {
        penalty_enabled: true,
        absent_threshold: 2,
        bonus_enabled: false,
    };
    let period = AttendancePeriod::month(2025, 6);

    c.bench_function("reconcile_month", |b| {
        b.iter(|| {
            black_box(
                reconcile_attendance(
                    &employee,
                    &rules,
                    &[],
                    &period,
                    AttendanceSources {
                        daily: &records,
                        ..AttendanceSources::default()
                    },
                )
                .expect("reconcile"),
            )
        })
    });
}

/// Benchmark: forced salary batches of growing size.
fn bench_salary_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("salary_batch");
    group.sample_size(10);

    for size in [100usize, 1000] {
        let (engine, tenant) = create_populated_engine(size);
        engine.calculate_salary_for_period(tenant, 2025, 6, false);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(engine.calculate_salary_for_period(tenant, 2025, 6, true)))
        });
    }

    group.finish();
}

/// Benchmark: the attendance report over HTTP with and without the cache.
fn bench_attendance_report(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("attendance_report");

    for (label, cached) in [("cached", true), ("uncached", false)] {
        let (engine, tenant) = if cached {
            create_populated_engine(100)
        } else {
            let engine = PayrollEngine::new(EngineConfig::default().without_cache());
            let tenant = engine.create_tenant("Bench Textiles").expect("tenant").id;
            for i in 0..100 {
                engine
                    .create_employee(tenant, NewEmployee::new(format!("Worker{i}"), "Bench", Decimal::from(24000)))
                    .expect("employee");
            }
            (engine, tenant)
        };
        let router = create_router(AppState::new(engine));
        let uri = format!("/tenants/{tenant}/attendance-records?time_period=this_month&as_of=2025-06-15");

        group.bench_function(label, |b| {
            b.to_async(&rt).iter(|| async {
                let router = router.clone();
                let response = router
                    .oneshot(Request::builder().method("GET").uri(uri.as_str()).body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                black_box(response)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_salary_formula,
    bench_reconcile_month,
    bench_salary_batch,
    bench_attendance_report,
);
criterion_main!(benches);
