//! Employee API endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{parse_id, ApiResult};
use crate::db::EmployeeFilter;
use crate::errors::AppError;
use crate::models::{
    validate_draft, DeleteConfirmation, Employee, EmployeeDraft, EmployeePage,
    UpdateEmployeeRequest,
};
use crate::AppState;

/// Query parameters of the list endpoint. Unknown parameters are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ListQuery {
    fn filter(&self) -> EmployeeFilter {
        EmployeeFilter {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            company_name: self.company_name.clone(),
            designation: self.designation.clone(),
        }
    }
}

/// GET /get-all-employees - List employees.
///
/// Answers with a bare array, or with a page object when both `page` and
/// `size` are given.
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Response> {
    let employees = state.repo.list_employees(&query.filter()).await?;

    match (query.page, query.size) {
        (Some(_), Some(0)) => Err(AppError::BadRequest(
            "Page size must be positive".to_string(),
        )),
        (Some(page), Some(size)) => Ok(Json(paginate(employees, page, size)).into_response()),
        _ => Ok(Json(employees).into_response()),
    }
}

fn paginate(employees: Vec<Employee>, page: u64, size: u64) -> EmployeePage {
    let total = employees.len() as u64;
    let content = employees
        .into_iter()
        .skip(page.saturating_mul(size) as usize)
        .take(size as usize)
        .collect();

    EmployeePage {
        content,
        total_elements: total,
        total_pages: total.div_ceil(size),
        number: page,
        size,
    }
}

/// GET /get-employee/:id - Get a single employee.
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let id = parse_id(&id)?;

    state
        .repo
        .get_employee(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
}

/// POST /create - Create a new employee.
pub async fn create_employee(
    State(state): State<AppState>,
    Json(draft): Json<EmployeeDraft>,
) -> ApiResult<Json<Employee>> {
    validate_draft(&draft).map_err(|msg| AppError::Validation(msg.to_string()))?;

    let employee = state.repo.create_employee(&draft).await?;
    tracing::info!("Created employee {}", employee.id);
    Ok(Json(employee))
}

/// PUT /update-employee/:id - Update an employee; omitted fields are kept.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> ApiResult<Json<Employee>> {
    let id = parse_id(&id)?;

    let existing = state
        .repo
        .get_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))?;

    let draft = request.merged_onto(&existing);
    validate_draft(&draft).map_err(|msg| AppError::Validation(msg.to_string()))?;

    let employee = state.repo.update_employee(id, &draft).await?;
    tracing::info!("Updated employee {}", id);
    Ok(Json(employee))
}

/// DELETE /delete-employee/:id - Delete an employee.
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteConfirmation>> {
    let id = parse_id(&id)?;

    state.repo.delete_employee(id).await?;
    tracing::info!("Deleted employee {}", id);
    Ok(Json(DeleteConfirmation { success: true }))
}
