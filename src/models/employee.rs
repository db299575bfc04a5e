//! Employee record model matching the employee-management REST contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned employee identifier.
///
/// Backends hand out either numeric or string ids, so both are accepted and
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeId::Int(id) => write!(f, "{}", id),
            EmployeeId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EmployeeId {
    fn from(id: i64) -> Self {
        EmployeeId::Int(id)
    }
}

impl From<&str> for EmployeeId {
    fn from(id: &str) -> Self {
        EmployeeId::Text(id.to_string())
    }
}

impl From<String> for EmployeeId {
    fn from(id: String) -> Self {
        EmployeeId::Text(id)
    }
}

/// An employee as returned by the record service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

impl Employee {
    /// Build a stored record from form values; empty optional fields are absent.
    pub fn from_draft(id: EmployeeId, draft: &EmployeeDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name.clone(),
            middle_name: non_empty(&draft.middle_name),
            last_name: non_empty(&draft.last_name),
            designation: non_empty(&draft.designation),
            company_name: non_empty(&draft.company_name),
            mobile_no: non_empty(&draft.mobile_no),
            email_id: non_empty(&draft.email_id),
        }
    }

    /// Fields consulted by the free-text search, in display order.
    pub fn searchable_fields(&self) -> [Option<&str>; 7] {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            self.last_name.as_deref(),
            self.company_name.as_deref(),
            self.designation.as_deref(),
            self.email_id.as_deref(),
            self.mobile_no.as_deref(),
        ]
    }

    /// Whether any searchable field contains `needle`.
    ///
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.searchable_fields()
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty())
            .any(|value| value.to_lowercase().contains(needle))
    }

    pub fn initials(&self) -> String {
        initials_of(&[
            self.first_name.as_str(),
            self.middle_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        ])
    }

    /// Table cell text for an optional column: absent or empty renders as `-`.
    pub fn display_field(value: Option<&str>) -> &str {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => "-",
        }
    }
}

/// Form values for creating or editing an employee.
///
/// Never carries an id: the server assigns it on create and the update path
/// addresses the record separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub designation: String,
    pub company_name: String,
    pub mobile_no: String,
    pub email_id: String,
}

impl EmployeeDraft {
    pub fn initials(&self) -> String {
        initials_of(&[
            self.first_name.as_str(),
            self.middle_name.as_str(),
            self.last_name.as_str(),
        ])
    }
}

impl From<Employee> for EmployeeDraft {
    fn from(employee: Employee) -> Self {
        Self {
            first_name: employee.first_name,
            middle_name: employee.middle_name.unwrap_or_default(),
            last_name: employee.last_name.unwrap_or_default(),
            designation: employee.designation.unwrap_or_default(),
            company_name: employee.company_name.unwrap_or_default(),
            mobile_no: employee.mobile_no.unwrap_or_default(),
            email_id: employee.email_id.unwrap_or_default(),
        }
    }
}

/// Request body for updating an employee; omitted fields keep their value,
/// empty strings clear optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub mobile_no: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
}

impl UpdateEmployeeRequest {
    /// Merge onto the stored record, producing the complete new form values.
    pub fn merged_onto(&self, existing: &Employee) -> EmployeeDraft {
        let pick = |update: &Option<String>, current: &Option<String>| {
            update
                .clone()
                .or_else(|| current.clone())
                .unwrap_or_default()
        };
        EmployeeDraft {
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| existing.first_name.clone()),
            middle_name: pick(&self.middle_name, &existing.middle_name),
            last_name: pick(&self.last_name, &existing.last_name),
            designation: pick(&self.designation, &existing.designation),
            company_name: pick(&self.company_name, &existing.company_name),
            mobile_no: pick(&self.mobile_no, &existing.mobile_no),
            email_id: pick(&self.email_id, &existing.email_id),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Avatar initials: first letter of each present name part, at most two.
fn initials_of(parts: &[&str]) -> String {
    let initials: String = parts
        .iter()
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.trim().chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();

    if initials.is_empty() {
        "EM".to_string()
    } else {
        initials
    }
}

/// Body returned by the delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    #[serde(default = "default_success")]
    pub success: bool,
}

impl Default for DeleteConfirmation {
    fn default() -> Self {
        Self { success: true }
    }
}

fn default_success() -> bool {
    true
}
