use std::fmt;
use std::path::Path;

use log::{debug, info};
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ToSql};

use crate::config::Config;
use crate::error::DatabaseError;

pub type Result<T> = std::result::Result<T, DatabaseError>;

const SCHEMA: &str = include_str!("../db/schema.sql");

/// The three entity tables of the company schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Department,
    Role,
    Employee,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Department => "department",
            Table::Role => "role",
            Table::Employee => "employee",
        }
    }

    /// Columns that `insert` and `update` are allowed to write.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Department => &["name"],
            Table::Role => &["title", "salary", "department_id"],
            Table::Employee => &["first_name", "last_name", "role_id", "manager_id"],
        }
    }

    fn check_column(&self, column: &str) -> Result<()> {
        if self.columns().contains(&column) {
            Ok(())
        } else {
            Err(DatabaseError::Statement(format!(
                "`{}` is not a writable column of `{}`",
                column,
                self.name()
            )))
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fixed, named read queries that join or aggregate across tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ByManager,
    ByDepartment,
    Budget,
}

impl ReportKind {
    fn sql(&self) -> &'static str {
        match self {
            ReportKind::ByManager => {
                "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department, \
                        r.salary, m.first_name || ' ' || m.last_name AS manager \
                 FROM employee e \
                 LEFT JOIN role r ON e.role_id = r.id \
                 LEFT JOIN department d ON r.department_id = d.id \
                 LEFT JOIN employee m ON e.manager_id = m.id \
                 ORDER BY manager, e.id"
            }
            ReportKind::ByDepartment => {
                "SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department \
                 FROM employee e \
                 LEFT JOIN role r ON e.role_id = r.id \
                 LEFT JOIN department d ON r.department_id = d.id \
                 ORDER BY d.name, e.id"
            }
            // Inner joins: departments without employees drop out.
            ReportKind::Budget => {
                "SELECT d.id, d.name AS department, SUM(r.salary) AS utilized_budget \
                 FROM role r \
                 JOIN department d ON r.department_id = d.id \
                 JOIN employee e ON e.role_id = r.id \
                 GROUP BY d.id, d.name \
                 ORDER BY utilized_budget DESC"
            }
        }
    }
}

/// A single cell as returned by, or handed to, the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(String::from(s))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<'a> From<ValueRef<'a>> for Value {
    fn from(value: ValueRef<'a>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Value::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Nulls render as an empty cell.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One result row; columns keep the order the statement produced them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new(cells: Vec<(String, Value)>) -> Self {
        Row { cells }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, value)| value)
    }
}

/// Typed access to the store: one operation per statement shape the application issues.
pub trait Gateway {
    /// `SELECT * FROM <table>`, in store order.
    fn fetch_all(&mut self, table: Table) -> Result<Vec<Row>>;

    /// Insert one row and return its generated id.
    fn insert(&mut self, table: Table, fields: &[(&str, Value)]) -> Result<i64>;

    /// Set a single column on the row keyed by `id`. Zero matched rows is not an error.
    fn update(&mut self, table: Table, id: i64, column: &str, value: Value) -> Result<usize>;

    fn delete(&mut self, table: Table, id: i64) -> Result<usize>;

    fn aggregate_report(&mut self, kind: ReportKind) -> Result<Vec<Row>>;

    /// Release the connection. Called exactly once, when the user exits.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Gateway over a single long-lived SQLite connection.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn connect(config: &Config) -> Result<Self> {
        let path = config.database_path();
        info!(
            "Connecting to {} as {}@{}:{} ({})",
            config.database,
            config.user,
            config.host,
            config.port,
            path.display()
        );
        if !config.password.is_empty() {
            debug!("DB_PASSWORD is set; the embedded store does not use credentials");
        }
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        info!("Connected to database.");
        Ok(SqliteGateway { conn })
    }

    /// Run a batch of statements, e.g. `db/seeds.sql`.
    pub fn apply_script(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query_rows(&self, sql: &str) -> Result<Vec<Row>> {
        debug!("{}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                cells.push((name.clone(), Value::from(row.get_ref(i)?)));
            }
            out.push(Row::new(cells));
        }
        Ok(out)
    }
}

impl Gateway for SqliteGateway {
    fn fetch_all(&mut self, table: Table) -> Result<Vec<Row>> {
        self.query_rows(&format!("SELECT * FROM {}", table.name()))
    }

    fn insert(&mut self, table: Table, fields: &[(&str, Value)]) -> Result<i64> {
        if fields.is_empty() {
            return Err(DatabaseError::Statement(format!(
                "no values given for insert into `{}`",
                table
            )));
        }
        for (column, _) in fields {
            table.check_column(column)?;
        }

        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders
        );
        debug!("{}", sql);

        self.conn
            .execute(&sql, params_from_iter(fields.iter().map(|(_, value)| value)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&mut self, table: Table, id: i64, column: &str, value: Value) -> Result<usize> {
        table.check_column(column)?;

        let sql = format!("UPDATE {} SET {} = ? WHERE id = ?", table.name(), column);
        debug!("{}", sql);
        Ok(self.conn.execute(&sql, params![value, id])?)
    }

    fn delete(&mut self, table: Table, id: i64) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
        debug!("{}", sql);
        Ok(self.conn.execute(&sql, [id])?)
    }

    fn aggregate_report(&mut self, kind: ReportKind) -> Result<Vec<Row>> {
        self.query_rows(kind.sql())
    }

    fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| DatabaseError::Connection(e.to_string()))?;
        info!("Database connection closed.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SqliteGateway {
        SqliteGateway::open_in_memory().unwrap()
    }

    fn add_department(db: &mut SqliteGateway, name: &str) -> i64 {
        db.insert(Table::Department, &[("name", Value::from(name))]).unwrap()
    }

    fn add_role(db: &mut SqliteGateway, title: &str, salary: f64, department_id: i64) -> i64 {
        db.insert(
            Table::Role,
            &[
                ("title", Value::from(title)),
                ("salary", Value::from(salary)),
                ("department_id", Value::from(department_id)),
            ],
        )
        .unwrap()
    }

    fn add_employee(
        db: &mut SqliteGateway,
        first: &str,
        last: &str,
        role_id: i64,
        manager_id: Option<i64>,
    ) -> i64 {
        db.insert(
            Table::Employee,
            &[
                ("first_name", Value::from(first)),
                ("last_name", Value::from(last)),
                ("role_id", Value::from(role_id)),
                ("manager_id", Value::from(manager_id)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn insert_then_fetch_returns_row_with_increasing_id() {
        let mut db = gateway();
        let first = add_department(&mut db, "Sales");
        let second = add_department(&mut db, "Legal");
        assert!(second > first);

        let rows = db.fetch_all(Table::Department).unwrap();
        let legal = rows.iter().find(|r| r.id() == Some(second)).unwrap();
        assert_eq!(legal.get("name"), Some(&Value::from("Legal")));
    }

    #[test]
    fn insert_with_missing_foreign_key_is_a_constraint_error() {
        let mut db = gateway();
        let err = db
            .insert(
                Table::Role,
                &[
                    ("title", Value::from("Ghost")),
                    ("salary", Value::from(1.0)),
                    ("department_id", Value::from(42i64)),
                ],
            )
            .unwrap_err();
        assert!(err.is_constraint());
        assert!(db.fetch_all(Table::Role).unwrap().is_empty());
    }

    #[test]
    fn unknown_columns_never_reach_the_store() {
        let mut db = gateway();
        let err = db
            .insert(Table::Department, &[("name; DROP TABLE role", Value::from("x"))])
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Statement(_)));

        let err = db.update(Table::Employee, 1, "salary", Value::from(1i64)).unwrap_err();
        assert!(matches!(err, DatabaseError::Statement(_)));
    }

    #[test]
    fn update_changes_only_the_named_column() {
        let mut db = gateway();
        let dept = add_department(&mut db, "Engineering");
        let junior = add_role(&mut db, "Engineer", 100.0, dept);
        let senior = add_role(&mut db, "Lead", 200.0, dept);
        let boss = add_employee(&mut db, "Ada", "Lovelace", senior, None);
        let worker = add_employee(&mut db, "Alan", "Turing", junior, Some(boss));

        let changed = db
            .update(Table::Employee, worker, "role_id", Value::from(senior))
            .unwrap();
        assert_eq!(changed, 1);

        let rows = db.fetch_all(Table::Employee).unwrap();
        let row = rows.iter().find(|r| r.id() == Some(worker)).unwrap();
        assert_eq!(row.get("role_id"), Some(&Value::Integer(senior)));
        assert_eq!(row.get("manager_id"), Some(&Value::Integer(boss)));
        assert_eq!(row.get("first_name"), Some(&Value::from("Alan")));
        assert_eq!(row.get("last_name"), Some(&Value::from("Turing")));
    }

    #[test]
    fn update_of_missing_row_is_not_an_error() {
        let mut db = gateway();
        let changed = db
            .update(Table::Department, 99, "name", Value::from("Nowhere"))
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn delete_without_dependents_removes_row() {
        let mut db = gateway();
        let dept = add_department(&mut db, "Legal");

        assert_eq!(db.delete(Table::Department, dept).unwrap(), 1);
        assert!(db.fetch_all(Table::Department).unwrap().is_empty());
    }

    #[test]
    fn delete_with_dependents_fails_and_keeps_row() {
        let mut db = gateway();
        let dept = add_department(&mut db, "Sales");
        let role = add_role(&mut db, "Salesperson", 80000.0, dept);
        add_employee(&mut db, "Mike", "Chan", role, None);

        let err = db.delete(Table::Role, role).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(db.fetch_all(Table::Role).unwrap().len(), 1);
    }

    #[test]
    fn deleting_a_manager_clears_reports_manager_id() {
        let mut db = gateway();
        let dept = add_department(&mut db, "Sales");
        let role = add_role(&mut db, "Salesperson", 80000.0, dept);
        let boss = add_employee(&mut db, "John", "Doe", role, None);
        let report = add_employee(&mut db, "Mike", "Chan", role, Some(boss));

        db.delete(Table::Employee, boss).unwrap();

        let rows = db.fetch_all(Table::Employee).unwrap();
        let row = rows.iter().find(|r| r.id() == Some(report)).unwrap();
        assert!(row.get("manager_id").unwrap().is_null());
    }

    #[test]
    fn budget_report_skips_departments_without_employees() {
        let mut db = gateway();
        let sales = add_department(&mut db, "Sales");
        let legal = add_department(&mut db, "Legal");
        let rnd = add_department(&mut db, "R&D");
        let seller = add_role(&mut db, "Salesperson", 80000.0, sales);
        let lawyer = add_role(&mut db, "Lawyer", 190000.0, legal);
        add_role(&mut db, "Intern", 0.0, rnd);
        add_employee(&mut db, "Mike", "Chan", seller, None);
        add_employee(&mut db, "Ashley", "Rodriguez", seller, None);
        add_employee(&mut db, "Tom", "Allen", lawyer, None);

        let rows = db.aggregate_report(ReportKind::Budget).unwrap();
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("department").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["Legal", "Sales"]);
        assert_eq!(
            rows[1].get("utilized_budget").and_then(Value::as_f64),
            Some(160000.0)
        );
    }

    #[test]
    fn manager_report_sorts_by_manager_then_id() {
        let mut db = gateway();
        let dept = add_department(&mut db, "Engineering");
        let role = add_role(&mut db, "Engineer", 100.0, dept);
        let zed = add_employee(&mut db, "Zed", "Shaw", role, None);
        let amy = add_employee(&mut db, "Amy", "Pond", role, None);
        let c = add_employee(&mut db, "Carl", "Sagan", role, Some(zed));
        let d = add_employee(&mut db, "Dana", "Scully", role, Some(amy));
        let e = add_employee(&mut db, "Eve", "Moneypenny", role, Some(amy));

        let rows = db.aggregate_report(ReportKind::ByManager).unwrap();
        let ids: Vec<i64> = rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec![zed, amy, d, e, c]);

        let unmanaged = rows.iter().find(|r| r.id() == Some(zed)).unwrap();
        assert!(unmanaged.get("manager").unwrap().is_null());
        assert_eq!(unmanaged.get("manager").unwrap().to_string(), "");

        let managed = rows.iter().find(|r| r.id() == Some(c)).unwrap();
        assert_eq!(managed.get("manager"), Some(&Value::from("Zed Shaw")));
    }

    #[test]
    fn department_report_sorts_by_department_then_id() {
        let mut db = gateway();
        let sales = add_department(&mut db, "Sales");
        let eng = add_department(&mut db, "Engineering");
        let seller = add_role(&mut db, "Salesperson", 1.0, sales);
        let engineer = add_role(&mut db, "Engineer", 1.0, eng);
        let a = add_employee(&mut db, "A", "One", seller, None);
        let b = add_employee(&mut db, "B", "Two", engineer, None);
        let c = add_employee(&mut db, "C", "Three", seller, None);

        let rows = db.aggregate_report(ReportKind::ByDepartment).unwrap();
        let ids: Vec<i64> = rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec![b, a, c]);
    }

    #[test]
    fn null_displays_as_empty_cell() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::Integer(3));
    }
}
