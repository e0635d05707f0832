use std::collections::HashSet;
use std::io::Write;

use log::{error, info, warn};

use crate::data_handling::Gateway;
use crate::error::{Error, Result};
use crate::handlers;
use crate::prompt::Prompter;

pub const EXIT_LABEL: &str = "Exit";
const MENU_MESSAGE: &str = "What would you like to do?";

/// Everything a handler works with: the store, the prompts, and the output stream.
pub struct Session<G, P, W> {
    pub(crate) gateway: G,
    pub(crate) prompter: P,
    pub(crate) out: W,
}

impl<G, P, W> Session<G, P, W> {
    pub fn new(gateway: G, prompter: P, out: W) -> Self {
        Session {
            gateway,
            prompter,
            out,
        }
    }
}

pub type Operation<G, P, W> = fn(&mut Session<G, P, W>) -> Result<()>;

pub enum Action<G, P, W> {
    Run(Operation<G, P, W>),
    Exit,
}

/// One menu entry.
pub struct Command<G, P, W> {
    pub label: &'static str,
    /// Printed when the operation fails.
    pub failure: &'static str,
    pub action: Action<G, P, W>,
}

/// What the loop does after a selection has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct TextInterface<G, P, W> {
    session: Session<G, P, W>,
    commands: Vec<Command<G, P, W>>,
}

impl<G: Gateway, P: Prompter, W: Write> TextInterface<G, P, W> {
    pub fn init(session: Session<G, P, W>) -> Result<Self> {
        Self::with_commands(session, Self::default_commands())
    }

    /// Fails with `DuplicateLabel` if two commands share a label.
    pub fn with_commands(session: Session<G, P, W>, commands: Vec<Command<G, P, W>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for command in &commands {
            if !seen.insert(command.label) {
                return Err(Error::DuplicateLabel(command.label.to_string()));
            }
        }

        Ok(TextInterface { session, commands })
    }

    fn default_commands() -> Vec<Command<G, P, W>> {
        fn run<G, P, W>(
            label: &'static str,
            failure: &'static str,
            operation: Operation<G, P, W>,
        ) -> Command<G, P, W> {
            Command {
                label,
                failure,
                action: Action::Run(operation),
            }
        }

        vec![
            run("View All Departments", "Unable to view departments.", handlers::view_departments),
            run("View All Roles", "Unable to view roles.", handlers::view_roles),
            run("View All Employees", "Unable to view employees.", handlers::view_employees),
            run(
                "View Employees by Manager",
                "Unable to view employees by manager.",
                handlers::view_by_manager,
            ),
            run(
                "View Employees by Department",
                "Unable to view employees by department.",
                handlers::view_by_department,
            ),
            run(
                "View Total Utilized Budget by Department",
                "Unable to view the utilized budget.",
                handlers::view_budget,
            ),
            run("Add Department", "Unable to add department.", handlers::add_department),
            run("Add Role", "Unable to add role.", handlers::add_role),
            run("Add Employee", "Unable to add employee.", handlers::add_employee),
            run(
                "Update Employee Role",
                "Unable to update employee's role.",
                handlers::update_employee_role,
            ),
            run(
                "Update Employee Manager",
                "Unable to update employee's manager.",
                handlers::update_employee_manager,
            ),
            run("Delete Department", "Unable to delete department.", handlers::delete_department),
            run("Delete Role", "Unable to delete role.", handlers::delete_role),
            run("Delete Employee", "Unable to delete employee.", handlers::delete_employee),
            Command {
                label: EXIT_LABEL,
                failure: "",
                action: Action::Exit,
            },
        ]
    }

    pub fn labels(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.label.to_string()).collect()
    }

    /// Show the menu until the user picks Exit, then release the connection.
    pub fn run(mut self) -> Result<()> {
        let labels = self.labels();

        let result = loop {
            let index = match self.session.prompter.select(MENU_MESSAGE, &labels) {
                Ok(index) => index,
                Err(e) => break Err(e),
            };

            match self.dispatch(labels.get(index).map(String::as_str)) {
                Ok(Flow::Continue) => continue,
                Ok(Flow::Exit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        info!("Closing database connection.");
        match (result, self.session.gateway.close()) {
            (Ok(()), closed) => Ok(closed?),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                error!("Closing the database connection failed: {}", close_error);
                Err(e)
            }
        }
    }

    /// Run the command behind `label`. Handler failures are reported here and do not end
    /// the session.
    pub fn dispatch(&mut self, label: Option<&str>) -> Result<Flow> {
        let command = match label.and_then(|l| self.commands.iter().find(|c| c.label == l)) {
            Some(command) => command,
            None => {
                warn!("invalid action: {:?}", label);
                return Ok(Flow::Continue);
            }
        };

        let (operation, failure, label) = match command.action {
            Action::Exit => {
                writeln!(self.session.out, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
            Action::Run(operation) => (operation, command.failure, command.label),
        };

        if let Err(e) = operation(&mut self.session) {
            error!("{}: {}", label, e);
            writeln!(self.session.out, "{}", failure)?;
        }
        writeln!(self.session.out)?;

        Ok(Flow::Continue)
    }
}
