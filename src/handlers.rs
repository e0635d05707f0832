//! One function per menu action. Each gathers lookup data, collects answers, issues a
//! single store call and prints a status line. Store errors bubble up to the dispatcher.

use std::io::Write;

use crate::data_handling::{Gateway, ReportKind, Table};
use crate::department::{Department, NewDepartment, NewRole, Role};
use crate::error::Result;
use crate::personnel::{Employee, ManagerChange, NewEmployee, Removal, RoleChange};
use crate::prompt::{collect, non_empty, non_negative_decimal, Choice, FieldSpec, Prompter};
use crate::table::print_rows;
use crate::textinterface::Session;

pub fn view_departments<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    view_all(s, Table::Department, "All Departments:")
}

pub fn view_roles<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    view_all(s, Table::Role, "All Roles:")
}

pub fn view_employees<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    view_all(s, Table::Employee, "All Employees:")
}

pub fn view_by_manager<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    view_report(s, ReportKind::ByManager, "Employees by Manager:")
}

pub fn view_by_department<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
) -> Result<()> {
    view_report(s, ReportKind::ByDepartment, "Employees by Department:")
}

pub fn view_budget<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    view_report(s, ReportKind::Budget, "Total Utilized Budget by Department:")
}

fn view_all<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
    table: Table,
    header: &str,
) -> Result<()> {
    let rows = s.gateway.fetch_all(table)?;
    print_rows(&mut s.out, header, &rows)?;
    Ok(())
}

fn view_report<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
    kind: ReportKind,
    header: &str,
) -> Result<()> {
    let rows = s.gateway.aggregate_report(kind)?;
    print_rows(&mut s.out, header, &rows)?;
    Ok(())
}

pub fn add_department<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    let answers = collect(
        &mut s.prompter,
        &[FieldSpec::text("name", "What is the name of the department?").validate_with(non_empty)],
    )?;
    let department = NewDepartment {
        name: answers.text("name")?,
    };

    s.gateway.insert(NewDepartment::TABLE, &department.fields())?;
    writeln!(s.out, "Added {} to departments.", department.name)?;
    Ok(())
}

pub fn add_role<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    let departments = department_choices(&mut s.gateway)?;
    if departments.is_empty() {
        writeln!(s.out, "No departments found. Add a department first.")?;
        return Ok(());
    }

    let answers = collect(
        &mut s.prompter,
        &[
            FieldSpec::text("title", "What is the name of the role?").validate_with(non_empty),
            FieldSpec::text("salary", "What is the salary of the role?")
                .validate_with(non_negative_decimal),
            FieldSpec::choice(
                "departmentId",
                "Which department does the role belong to?",
                departments,
            ),
        ],
    )?;
    let role = NewRole {
        title: answers.text("title")?,
        salary: answers.decimal("salary")?,
        department_id: answers.id("departmentId")?,
    };

    s.gateway.insert(NewRole::TABLE, &role.fields())?;
    writeln!(s.out, "Added {} to roles.", role.title)?;
    Ok(())
}

pub fn add_employee<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    let roles = role_choices(&mut s.gateway)?;
    if roles.is_empty() {
        writeln!(s.out, "No roles found. Add a role first.")?;
        return Ok(());
    }
    let mut managers = vec![Choice::none()];
    managers.extend(employee_choices(&mut s.gateway)?);

    let answers = collect(
        &mut s.prompter,
        &[
            FieldSpec::text("firstName", "What is the employee's first name?")
                .validate_with(non_empty),
            FieldSpec::text("lastName", "What is the employee's last name?")
                .validate_with(non_empty),
            FieldSpec::choice("roleId", "What is the employee's role?", roles),
            FieldSpec::choice("managerId", "Who is the employee's manager?", managers),
        ],
    )?;
    let employee = NewEmployee {
        first_name: answers.text("firstName")?,
        last_name: answers.text("lastName")?,
        role_id: answers.id("roleId")?,
        manager_id: answers.optional_id("managerId")?,
    };

    s.gateway.insert(NewEmployee::TABLE, &employee.fields())?;
    writeln!(s.out, "Added {} to employees.", employee.name())?;
    Ok(())
}

pub fn update_employee_role<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
) -> Result<()> {
    let employees = employee_choices(&mut s.gateway)?;
    if employees.is_empty() {
        writeln!(s.out, "No employees found.")?;
        return Ok(());
    }
    let roles = role_choices(&mut s.gateway)?;
    if roles.is_empty() {
        writeln!(s.out, "No roles found. Add a role first.")?;
        return Ok(());
    }

    let answers = collect(
        &mut s.prompter,
        &[
            FieldSpec::choice("employeeId", "Which employee's role do you want to update?", employees),
            FieldSpec::choice("roleId", "Which role do you want to assign?", roles),
        ],
    )?;
    let change = RoleChange {
        employee_id: answers.id("employeeId")?,
        role_id: answers.id("roleId")?,
    };

    s.gateway.update(
        Table::Employee,
        change.employee_id,
        RoleChange::COLUMN,
        change.role_id.into(),
    )?;
    writeln!(s.out, "Updated employee's role.")?;
    Ok(())
}

pub fn update_employee_manager<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
) -> Result<()> {
    let employees = employee_choices(&mut s.gateway)?;
    if employees.is_empty() {
        writeln!(s.out, "No employees found.")?;
        return Ok(());
    }
    let mut managers = vec![Choice::none()];
    managers.extend(employees.iter().cloned());

    let answers = collect(
        &mut s.prompter,
        &[
            FieldSpec::choice(
                "employeeId",
                "Which employee's manager do you want to update?",
                employees,
            ),
            FieldSpec::choice("managerId", "Who is the employee's new manager?", managers),
        ],
    )?;
    let change = ManagerChange {
        employee_id: answers.id("employeeId")?,
        manager_id: answers.optional_id("managerId")?,
    };

    s.gateway.update(
        Table::Employee,
        change.employee_id,
        ManagerChange::COLUMN,
        change.manager_id.into(),
    )?;
    writeln!(s.out, "Updated employee's manager.")?;
    Ok(())
}

pub fn delete_department<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
) -> Result<()> {
    let departments = department_choices(&mut s.gateway)?;
    delete(s, Table::Department, departments, "Which department do you want to delete?")
}

pub fn delete_role<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    let roles = role_choices(&mut s.gateway)?;
    delete(s, Table::Role, roles, "Which role do you want to delete?")
}

pub fn delete_employee<G: Gateway, P: Prompter, W: Write>(s: &mut Session<G, P, W>) -> Result<()> {
    let employees = employee_choices(&mut s.gateway)?;
    delete(s, Table::Employee, employees, "Which employee do you want to delete?")
}

fn delete<G: Gateway, P: Prompter, W: Write>(
    s: &mut Session<G, P, W>,
    table: Table,
    targets: Vec<Choice>,
    message: &str,
) -> Result<()> {
    if targets.is_empty() {
        writeln!(s.out, "Nothing to delete.")?;
        return Ok(());
    }

    let answers = collect(&mut s.prompter, &[FieldSpec::choice("id", message, targets)])?;
    let removal = Removal {
        id: answers.id("id")?,
    };

    s.gateway.delete(table, removal.id)?;
    writeln!(s.out, "Deleted {}.", table)?;
    Ok(())
}

// Choice lists keep the store's row order.

fn department_choices<G: Gateway>(gateway: &mut G) -> Result<Vec<Choice>> {
    Ok(gateway
        .fetch_all(Table::Department)?
        .iter()
        .filter_map(Department::from_row)
        .map(|d| Choice::new(d.name, d.id))
        .collect())
}

fn role_choices<G: Gateway>(gateway: &mut G) -> Result<Vec<Choice>> {
    Ok(gateway
        .fetch_all(Table::Role)?
        .iter()
        .filter_map(Role::from_row)
        .map(|r| Choice::new(r.title, r.id))
        .collect())
}

fn employee_choices<G: Gateway>(gateway: &mut G) -> Result<Vec<Choice>> {
    Ok(gateway
        .fetch_all(Table::Employee)?
        .iter()
        .filter_map(Employee::from_row)
        .map(|e| Choice::new(e.name.to_string(), e.id))
        .collect())
}
