//! HTTP API for the Payroll Engine.
//!
//! A thin axum router over [`PayrollEngine`](crate::services::PayrollEngine).
//! Every route is scoped by tenant id.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculateParams, DailyAttendanceRequest, MarkPaidRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
