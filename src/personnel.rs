use std::fmt;

use crate::data_handling::{Row, Table, Value};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Name {
    pub first: String,
    pub last: String,
}

/// "first last", the way employees are labeled in menus and reports.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: Name,
    pub role_id: i64,
    pub manager_id: Option<i64>,
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Employee {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Employee {
            id: row.id()?,
            name: Name {
                first: row.get("first_name")?.to_string(),
                last: row.get("last_name")?.to_string(),
            },
            role_id: row.get("role_id")?.as_i64()?,
            manager_id: row.get("manager_id").and_then(Value::as_i64),
        })
    }
}

/// Answers of the "Add Employee" form. `first_name` is stored as `first_name`, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: i64,
    pub manager_id: Option<i64>,
}

impl NewEmployee {
    pub const TABLE: Table = Table::Employee;

    pub fn name(&self) -> Name {
        Name {
            first: self.first_name.clone(),
            last: self.last_name.clone(),
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("first_name", Value::from(self.first_name.as_str())),
            ("last_name", Value::from(self.last_name.as_str())),
            ("role_id", Value::from(self.role_id)),
            ("manager_id", Value::from(self.manager_id)),
        ]
    }
}

/// Answers of "Update Employee Role". Only `role_id` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub employee_id: i64,
    pub role_id: i64,
}

impl RoleChange {
    pub const COLUMN: &'static str = "role_id";
}

/// Answers of "Update Employee Manager". Only `manager_id` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerChange {
    pub employee_id: i64,
    pub manager_id: Option<i64>,
}

impl ManagerChange {
    pub const COLUMN: &'static str = "manager_id";
}

/// Answers of any of the delete forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub id: i64,
}
