//! In-memory record service for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{DeleteConfirmation, Employee, EmployeeDraft, EmployeeId};
use crate::service::{EmployeeService, ListParams, ServiceResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    GetById(EmployeeId),
    Create(EmployeeDraft),
    Update(EmployeeId, EmployeeDraft),
    Remove(EmployeeId),
}

/// Behaves like the backend (server-assigned ids, 404 on unknown ids) and
/// records every call. Failures can be queued per call.
#[derive(Default)]
pub struct ScriptedService {
    records: Mutex<Vec<Employee>>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<ServiceError>>,
    list_delay: Mutex<Option<Duration>>,
    mutation_delay: Mutex<Option<Duration>>,
}

impl ScriptedService {
    pub fn with_records(records: Vec<Employee>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| match r.id {
                EmployeeId::Int(id) => Some(id),
                EmployeeId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            records: Mutex::new(records),
            next_id: Mutex::new(next_id),
            ..Default::default()
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ServiceError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn delay_lists(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Hold creates, updates and removes for `delay` before answering.
    pub fn delay_mutations(&self, delay: Duration) {
        *self.mutation_delay.lock().unwrap() = Some(delay);
    }

    async fn pause_mutation(&self) {
        let delay = *self.mutation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<Employee> {
        self.records.lock().unwrap().clone()
    }

    pub fn push(&self, employee: Employee) {
        self.records.lock().unwrap().push(employee);
    }

    fn enter(&self, call: Call) -> ServiceResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(id: &EmployeeId) -> ServiceError {
        ServiceError::request_failed(Some(404), format!("Employee {} not found", id))
    }
}

pub fn employee(id: i64, first: &str, company: &str) -> Employee {
    Employee {
        id: EmployeeId::Int(id),
        first_name: first.to_string(),
        middle_name: None,
        last_name: None,
        designation: None,
        company_name: Some(company.to_string()),
        mobile_no: None,
        email_id: None,
    }
}

#[async_trait]
impl EmployeeService for ScriptedService {
    async fn list(&self, _params: &ListParams) -> ServiceResult<Vec<Employee>> {
        self.enter(Call::List)?;
        let snapshot = self.records();
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(snapshot)
    }

    async fn get_by_id(&self, id: &EmployeeId) -> ServiceResult<Employee> {
        self.enter(Call::GetById(id.clone()))?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        self.enter(Call::Create(draft.clone()))?;
        self.pause_mutation().await;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        let created = Employee::from_draft(EmployeeId::Int(id), draft);
        self.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &EmployeeId, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        self.enter(Call::Update(id.clone(), draft.clone()))?;
        self.pause_mutation().await;
        let mut records = self.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        *slot = Employee::from_draft(id.clone(), draft);
        Ok(slot.clone())
    }

    async fn remove(&self, id: &EmployeeId) -> ServiceResult<DeleteConfirmation> {
        self.enter(Call::Remove(id.clone()))?;
        self.pause_mutation().await;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| &r.id != id);
        if records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(DeleteConfirmation { success: true })
    }
}
