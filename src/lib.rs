pub mod config;
pub mod data_handling;
pub mod department;
pub mod error;
pub mod handlers;
pub mod personnel;
pub mod prompt;
pub mod table;
pub mod textinterface;

pub use config::Config;
pub use data_handling::{Gateway, ReportKind, Row, SqliteGateway, Table, Value};
pub use error::{DatabaseError, Error, Result, ValidationError};
pub use textinterface::{Session, TextInterface};
