//! Centralized error handling for the ETL run.
//!
//! Every stage returns [`Result`], so a failure in one table is a value the
//! pipeline can log and record instead of a panic:
//!
//! ```
//! use retail_etl::error::EtlError;
//!
//! fn describe(err: &EtlError) -> &'static str {
//!     match err {
//!         EtlError::InvalidPath(_) => "input file missing",
//!         EtlError::Database(_) => "load failed",
//!         _ => "other failure",
//!     }
//! }
//! ```
//!
//! The [`ResultExt`] trait adds `.context()` to any result whose error
//! converts into [`EtlError`]:
//!
//! ```no_run
//! use retail_etl::error::ResultExt as _;
//!
//! fn read_raw(path: &str) -> retail_etl::error::Result<Vec<u8>> {
//!     std::fs::read(path).context("Failed to read CSV file")
//! }
//! ```

use std::fmt;

/// Main error type for ETL operations.
#[derive(Debug)]
pub enum EtlError {
    /// I/O errors (file reads, report writes)
    Io(std::io::Error),

    /// Input bytes could not be decoded with the detected encoding
    Encoding(String),

    /// Data processing errors (Polars, CSV parsing, value coercion)
    DataProcessing(String),

    /// A column the transform relies on is not present
    MissingColumn(String),

    /// Database connection or write errors
    Database(String),

    /// Configuration errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Encoding(msg) => write!(f, "Encoding error: {msg}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::MissingColumn(name) => write!(f, "Missing column: {name}"),
            Self::Database(msg) => write!(f, "Database error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EtlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for EtlError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<dotenvy::Error> for EtlError {
    fn from(err: dotenvy::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for ETL operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EtlError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap(msg.into(), e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(f(), e.into()))
    }
}

// Keeps the variant so callers can still tell a database failure from a
// parse failure after context has been attached.
fn wrap(msg: String, err: EtlError) -> EtlError {
    match err {
        EtlError::Io(e) => EtlError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}"))),
        EtlError::Encoding(m) => EtlError::Encoding(format!("{msg}: {m}")),
        EtlError::DataProcessing(m) => EtlError::DataProcessing(format!("{msg}: {m}")),
        EtlError::MissingColumn(m) => EtlError::MissingColumn(format!("{m} ({msg})")),
        EtlError::Database(m) => EtlError::Database(format!("{msg}: {m}")),
        EtlError::Config(m) => EtlError::Config(format!("{msg}: {m}")),
        EtlError::InvalidPath(m) => EtlError::InvalidPath(format!("{msg}: {m}")),
        EtlError::Other(m) => EtlError::Other(format!("{msg}: {m}")),
    }
}
