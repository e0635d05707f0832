use std::fmt;

use crate::data_handling::{Row, Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Department {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Department {
            id: row.id()?,
            name: row.get("name")?.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: i64,
    pub title: String,
    pub salary: f64,
    pub department_id: i64,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl Role {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Role {
            id: row.id()?,
            title: row.get("title")?.to_string(),
            salary: row.get("salary")?.as_f64()?,
            department_id: row.get("department_id")?.as_i64()?,
        })
    }
}

/// Answers of the "Add Department" form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDepartment {
    pub name: String,
}

impl NewDepartment {
    pub const TABLE: Table = Table::Department;

    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("name", Value::from(self.name.as_str()))]
    }
}

/// Answers of the "Add Role" form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub title: String,
    pub salary: f64,
    pub department_id: i64,
}

impl NewRole {
    pub const TABLE: Table = Table::Role;

    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", Value::from(self.title.as_str())),
            ("salary", Value::from(self.salary)),
            ("department_id", Value::from(self.department_id)),
        ]
    }
}
