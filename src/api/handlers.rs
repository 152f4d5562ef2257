//! HTTP request handlers for the Payroll Engine API.
//!
//! Handlers are thin: they decode the request, call the engine and map the
//! outcome to a status code. Engine errors go through [`ApiErrorResponse`].

use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::month_bounds;
use crate::error::EngineError;
use crate::models::TenantId;
use crate::services::{AttendanceQuery, CalculationStatus, ChartQuery};

use super::request::{
    AttendanceDayPath, CalculateParams, DailyAttendanceRequest, MarkPaidRequest, PeriodPath,
    SalaryPath,
};
use super::response::ApiErrorResponse;
use super::state::AppState;

type HandlerResult = Result<Response, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tenants/:tenant_id/attendance", post(record_attendance_handler))
        .route(
            "/tenants/:tenant_id/attendance/:employee_id/:date",
            delete(delete_attendance_handler),
        )
        .route(
            "/tenants/:tenant_id/payroll/:year/:month/calculate",
            post(calculate_payroll_handler),
        )
        .route(
            "/tenants/:tenant_id/salaries/:salary_id/mark-paid",
            post(mark_paid_handler),
        )
        .route(
            "/tenants/:tenant_id/attendance-records",
            get(attendance_records_handler),
        )
        .route("/tenants/:tenant_id/charts", get(charts_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn log_failure(correlation_id: Uuid, error: &ApiErrorResponse) {
    warn!(
        correlation_id = %correlation_id,
        status = error.status.as_u16(),
        code = %error.error.code,
        message = %error.error.message,
        "request failed"
    );
}

/// Runs a handler body, logging failures under the request's correlation id.
fn respond(correlation_id: Uuid, result: HandlerResult) -> Response {
    match result {
        Ok(response) => response,
        Err(error) => {
            log_failure(correlation_id, &error);
            error.into_response()
        }
    }
}

/// Handler for `POST /tenants/:tenant_id/attendance`.
async fn record_attendance_handler(
    State(state): State<AppState>,
    path: Result<Path<TenantId>, PathRejection>,
    payload: Result<Json<DailyAttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(tenant_id) = path?;
        let Json(request) = payload?;
        info!(
            correlation_id = %correlation_id,
            tenant_id = %tenant_id,
            employee_id = %request.employee_id,
            date = %request.date,
            "recording attendance"
        );
        let record = state
            .engine()
            .record_daily_attendance(tenant_id, request.into_record(tenant_id))?;
        Ok(json_response(StatusCode::OK, record))
    })();
    respond(correlation_id, result)
}

/// Handler for `DELETE /tenants/:tenant_id/attendance/:employee_id/:date`.
async fn delete_attendance_handler(
    State(state): State<AppState>,
    path: Result<Path<AttendanceDayPath>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(day) = path?;
        state
            .engine()
            .delete_daily_attendance(day.tenant_id, &day.employee_id, day.date)?;
        info!(
            correlation_id = %correlation_id,
            tenant_id = %day.tenant_id,
            employee_id = %day.employee_id,
            date = %day.date,
            "attendance deleted"
        );
        Ok(StatusCode::NO_CONTENT.into_response())
    })();
    respond(correlation_id, result)
}

/// Handler for `POST /tenants/:tenant_id/payroll/:year/:month/calculate`.
///
/// A locked period answers 409; a batch with per-employee errors still
/// answers 200 and lists them in the summary.
async fn calculate_payroll_handler(
    State(state): State<AppState>,
    path: Result<Path<PeriodPath>, PathRejection>,
    params: Result<Query<CalculateParams>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(period) = path?;
        let Query(params) = params?;
        if month_bounds(period.year, period.month).is_none() {
            return Err(ApiErrorResponse::bad_request(format!(
                "{}-{} is not a valid month",
                period.year, period.month
            )));
        }
        state.engine().tenant(period.tenant_id)?;

        let start_time = Instant::now();
        let summary = state.engine().calculate_salary_for_period(
            period.tenant_id,
            period.year,
            period.month,
            params.force_recalculate,
        );
        info!(
            correlation_id = %correlation_id,
            tenant_id = %period.tenant_id,
            year = period.year,
            month = period.month,
            status = ?summary.status,
            duration_us = start_time.elapsed().as_micros(),
            "salary batch handled"
        );
        match summary.status {
            CalculationStatus::Completed => Ok(json_response(StatusCode::OK, summary)),
            CalculationStatus::Locked => Err(EngineError::PeriodLocked {
                year: period.year,
                month: period.month,
            }
            .into()),
            CalculationStatus::Failed => Err(EngineError::CalculationError {
                message: summary.errors.join("; "),
            }
            .into()),
        }
    })();
    respond(correlation_id, result)
}

/// Handler for `POST /tenants/:tenant_id/salaries/:salary_id/mark-paid`.
async fn mark_paid_handler(
    State(state): State<AppState>,
    path: Result<Path<SalaryPath>, PathRejection>,
    payload: Result<Json<MarkPaidRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(salary) = path?;
        let Json(request) = payload?;
        let paid = state
            .engine()
            .mark_salary_as_paid(salary.tenant_id, salary.salary_id, request.payment_date)?;
        Ok(json_response(StatusCode::OK, paid))
    })();
    respond(correlation_id, result)
}

/// Handler for `GET /tenants/:tenant_id/attendance-records`.
async fn attendance_records_handler(
    State(state): State<AppState>,
    path: Result<Path<TenantId>, PathRejection>,
    query: Result<Query<AttendanceQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(tenant_id) = path?;
        let Query(query) = query?;
        let report = state.engine().attendance_records(tenant_id, &query)?;
        Ok(json_response(StatusCode::OK, report))
    })();
    respond(correlation_id, result)
}

/// Handler for `GET /tenants/:tenant_id/charts`.
async fn charts_handler(
    State(state): State<AppState>,
    path: Result<Path<TenantId>, PathRejection>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let result = (|| -> HandlerResult {
        let Path(tenant_id) = path?;
        let Query(query) = query?;
        let report = state.engine().frontend_charts(tenant_id, &query)?;
        Ok(json_response(StatusCode::OK, report))
    })();
    respond(correlation_id, result)
}
