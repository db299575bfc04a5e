//! Record service: the employee-management REST operations behind one trait.
//!
//! Implementations are stateless and may be shared across view sessions.
//! Every failure surfaces as `ServiceError::RequestFailed`; nothing here retries.

mod http;

pub use http::*;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{DeleteConfirmation, Employee, EmployeeDraft, EmployeeId};

/// Server-side filter parameters, passed through unvalidated.
pub type ListParams = BTreeMap<String, String>;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Fetch every record matching `params`, normalized to a plain list.
    async fn list(&self, params: &ListParams) -> ServiceResult<Vec<Employee>>;

    async fn get_by_id(&self, id: &EmployeeId) -> ServiceResult<Employee>;

    /// Create a record; the server assigns the id.
    async fn create(&self, draft: &EmployeeDraft) -> ServiceResult<Employee>;

    async fn update(&self, id: &EmployeeId, draft: &EmployeeDraft) -> ServiceResult<Employee>;

    /// Delete a record. Deleting an id twice fails the second time.
    async fn remove(&self, id: &EmployeeId) -> ServiceResult<DeleteConfirmation>;
}
