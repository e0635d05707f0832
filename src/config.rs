use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DatabaseError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_DATABASE: &str = "company_db";

/// Connection settings, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Accepted so `.env` files written for a networked server keep working. The embedded
    /// store has no login, so the password is never sent anywhere.
    pub password: String,
    pub database: String,
}

impl Config {
    /// Load `.env` (if any) and read the `DB_*` variables from the process environment.
    pub fn from_env() -> Result<Self, DatabaseError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(DatabaseError::Config(format!("could not read .env: {}", e)));
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Missing optional variables take
    /// their defaults; `DB_USER` is required and `DB_PORT` must be a valid port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        if host.trim().is_empty() {
            return Err(DatabaseError::Config("DB_HOST is empty".to_string()));
        }

        let port = match lookup("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                DatabaseError::Config(format!("DB_PORT `{}` is not a valid port", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let user = lookup("DB_USER")
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| DatabaseError::Config("DB_USER is not set".to_string()))?;

        let password = lookup("DB_PASSWORD").unwrap_or_default();

        let database = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        if database.trim().is_empty() {
            return Err(DatabaseError::Config("DB_NAME is empty".to_string()));
        }

        Ok(Config {
            host: host.trim().to_string(),
            port,
            user: user.trim().to_string(),
            password,
            database: database.trim().to_string(),
        })
    }

    /// Where the embedded store keeps `database`. A bare name gets a `.db` extension.
    pub fn database_path(&self) -> PathBuf {
        if self.database == ":memory:" || Path::new(&self.database).extension().is_some() {
            PathBuf::from(&self.database)
        } else {
            PathBuf::from(format!("{}.db", self.database))
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}
