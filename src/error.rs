use rusqlite::ErrorCode;
use thiserror::Error;

/// Failures coming from the store or from establishing a session with it.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("malformed statement: {0}")]
    Statement(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DatabaseError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, DatabaseError::Constraint(_))
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation => DatabaseError::Constraint(error.to_string()),
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied => DatabaseError::Connection(error.to_string()),
                _ => DatabaseError::Statement(error.to_string()),
            },
            _ => DatabaseError::Statement(error.to_string()),
        }
    }
}

/// Message shown when an interactive answer is refused by a field validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Menu label `{0}` is registered twice")]
    DuplicateLabel(String),

    #[error("No answer collected for field `{0}`")]
    MissingAnswer(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
