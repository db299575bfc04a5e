//! Database repository for employee CRUD operations.
//!
//! Uses prepared statements with bound parameters throughout.

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{Employee, EmployeeDraft, EmployeeId};

const COLUMNS: &str =
    "id, first_name, middle_name, last_name, designation, company_name, mobile_no, email_id";

/// Server-side filters of the list endpoint.
///
/// Each present filter is a case-insensitive substring match on its column.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub designation: Option<String>,
}

impl EmployeeFilter {
    fn columns(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("company_name", &self.company_name),
            ("designation", &self.designation),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List employees matching `filter`, oldest first.
    pub async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, AppError> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM employees WHERE 1 = 1", COLUMNS));
        for (column, value) in filter.columns() {
            query.push(format!(" AND {} LIKE ", column));
            query.push_bind(like_pattern(value));
            query.push(" ESCAPE '\\'");
        }
        query.push(" ORDER BY id");

        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(employee_from_row).collect())
    }

    /// Get an employee by ID.
    pub async fn get_employee(&self, id: i64) -> Result<Option<Employee>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM employees WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(employee_from_row))
    }

    /// Create a new employee; the database assigns the id.
    pub async fn create_employee(&self, draft: &EmployeeDraft) -> Result<Employee, AppError> {
        let employee = Employee::from_draft(EmployeeId::Int(0), draft);

        let result = sqlx::query(
            "INSERT INTO employees (first_name, middle_name, last_name, designation, company_name, mobile_no, email_id) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.last_name)
        .bind(&employee.designation)
        .bind(&employee.company_name)
        .bind(&employee.mobile_no)
        .bind(&employee.email_id)
        .execute(&self.pool)
        .await?;

        Ok(Employee {
            id: EmployeeId::Int(result.last_insert_rowid()),
            ..employee
        })
    }

    /// Replace every mutable field of an employee.
    pub async fn update_employee(
        &self,
        id: i64,
        draft: &EmployeeDraft,
    ) -> Result<Employee, AppError> {
        let employee = Employee::from_draft(EmployeeId::Int(id), draft);

        let result = sqlx::query(
            "UPDATE employees SET first_name = ?, middle_name = ?, last_name = ?, designation = ?, company_name = ?, mobile_no = ?, email_id = ?, updated_at = datetime('now') WHERE id = ?"
        )
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.last_name)
        .bind(&employee.designation)
        .bind(&employee.company_name)
        .bind(&employee.mobile_no)
        .bind(&employee.email_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }

        Ok(employee)
    }

    /// Delete an employee.
    pub async fn delete_employee(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }

        Ok(())
    }
}

// Helper functions for row conversion

fn employee_from_row(row: &sqlx::sqlite::SqliteRow) -> Employee {
    Employee {
        id: EmployeeId::Int(row.get("id")),
        first_name: row.get("first_name"),
        middle_name: row.get("middle_name"),
        last_name: row.get("last_name"),
        designation: row.get("designation"),
        company_name: row.get("company_name"),
        mobile_no: row.get("mobile_no"),
        email_id: row.get("email_id"),
    }
}

/// `%value%` with LIKE wildcards in `value` escaped.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
