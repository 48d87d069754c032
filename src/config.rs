//! Database connection settings for the loader.
//!
//! Settings come from an environment file (by default `./venv/.env`) with
//! the keys `USERNAME`, `HOST`, `PASSWORD` and `PORT`. A key the file does
//! not define falls back to the process environment.

use crate::error::{EtlError, Result, ResultExt as _};
use secrecy::{ExposeSecret as _, SecretString};
use sqlx::postgres::PgConnectOptions;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_ENV_FILE: &str = "./venv/.env";
pub const DEFAULT_DATABASE: &str = "ETL";
pub const DEFAULT_PORT: u16 = 5432;

const KEY_USERNAME: &str = "USERNAME";
const KEY_HOST: &str = "HOST";
const KEY_PASSWORD: &str = "PASSWORD";
const KEY_PORT: &str = "PORT";

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub username: String,
    pub host: String,
    pub password: SecretString,
    pub port: u16,
    pub database: String,
}

impl DbConfig {
    /// Reads connection settings from `env_file`, targeting `database`.
    ///
    /// A key set in the file takes precedence over the same key in the
    /// process environment; the process environment only fills keys the
    /// file leaves out.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Config`] if the file cannot be parsed, a required
    /// key is missing everywhere, or `PORT` is not a valid port number.
    pub fn from_env_file(env_file: &Path, database: &str) -> Result<Self> {
        let file_values = read_env_file(env_file)?;
        Self::from_lookup(database, |key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    fn from_lookup<F>(database: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| EtlError::Config(format!("{key} is not set")))
        };

        let port = match lookup(KEY_PORT) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| EtlError::Config(format!("invalid {KEY_PORT} '{raw}': {e}")))?,
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            username: required(KEY_USERNAME)?,
            host: required(KEY_HOST)?,
            password: SecretString::new(required(KEY_PASSWORD)?.into()),
            port,
            database: database.to_owned(),
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database)
    }

    /// Connection target without credentials, safe to log.
    pub fn display_target(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        tracing::warn!(
            "Environment file {} not found, using process environment",
            path.display()
        );
        return Ok(HashMap::new());
    }

    let mut values = HashMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open environment file {}", path.display()))?;
    for item in iter {
        let (key, value) = item.context("Failed to parse environment file")?;
        values.insert(key, value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_env(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write env");
        file
    }

    #[test]
    fn test_reads_values_from_env_file() {
        let file = write_env("USERNAME=etl_user\nHOST=db.local\nPASSWORD=s3cret\nPORT=6543\n");
        let config = DbConfig::from_env_file(file.path(), "ETL").expect("config");

        assert_eq!(config.username, "etl_user");
        assert_eq!(config.host, "db.local");
        assert_eq!(config.password.expose_secret(), "s3cret");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, "ETL");
        assert_eq!(config.display_target(), "postgres://etl_user@db.local:6543/ETL");
    }

    #[test]
    fn test_port_defaults_when_absent() {
        let values: HashMap<&str, &str> =
            HashMap::from([("USERNAME", "u"), ("HOST", "h"), ("PASSWORD", "p")]);
        let config = DbConfig::from_lookup("ETL", |k| values.get(k).map(|v| (*v).to_owned()))
            .expect("config");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let values: HashMap<&str, &str> = HashMap::from([
            ("USERNAME", "u"),
            ("HOST", "h"),
            ("PASSWORD", "p"),
            ("PORT", "not-a-port"),
        ]);
        let err = DbConfig::from_lookup("ETL", |k| values.get(k).map(|v| (*v).to_owned()))
            .unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_missing_host_is_config_error() {
        let values: HashMap<&str, &str> = HashMap::from([("USERNAME", "u"), ("PASSWORD", "p")]);
        let err = DbConfig::from_lookup("ETL", |k| values.get(k).map(|v| (*v).to_owned()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: HOST is not set");
    }
}
