//! Response shapes of the list endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Employee;

/// A page of employees in the `{ content: [...] }` envelope some backends use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePage {
    pub content: Vec<Employee>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub size: u64,
}

/// Everything the list endpoint may answer with.
///
/// Resolved once at the service boundary; callers only ever see the records.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    /// A bare JSON array of records.
    Records(Vec<Employee>),
    /// An object carrying the records in `content`.
    Page(EmployeePage),
    /// Any other shape; treated as an empty list.
    Unrecognized,
}

impl ListPayload {
    /// Classify a decoded response body.
    ///
    /// Malformed records inside a recognized shape are an error rather than
    /// being silently dropped.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(_) => Ok(ListPayload::Records(serde_json::from_value(value)?)),
            Value::Object(ref map) if map.get("content").is_some_and(Value::is_array) => {
                Ok(ListPayload::Page(serde_json::from_value(value)?))
            }
            _ => Ok(ListPayload::Unrecognized),
        }
    }

    pub fn into_records(self) -> Vec<Employee> {
        match self {
            ListPayload::Records(records) => records,
            ListPayload::Page(page) => page.content,
            ListPayload::Unrecognized => Vec::new(),
        }
    }
}
