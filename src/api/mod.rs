//! REST API module.
//!
//! Serves the employee-management surface consumed by `HttpEmployeeService`.
//! Successful responses carry the bare resource; failures use the
//! `ErrorResponse` envelope.

mod employees;

pub use employees::*;

use crate::errors::AppError;

pub type ApiResult<T> = Result<T, AppError>;

/// Path ids are numeric; anything else cannot name an employee.
fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Employee {} not found", raw)))
}
