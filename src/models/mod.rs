//! Data models for the employee admin.
//!
//! These models match the employee-management REST contract field for field
//! (camelCase on the wire).

mod employee;
mod payload;
mod validation;

pub use employee::*;
pub use payload::*;
pub use validation::*;
