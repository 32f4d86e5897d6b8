//! Centralized error handling for metatable.
//!
//! Every public operation returns [`Result`], whose error type is the
//! [`CatalogError`] enum. Errors coming out of polars, `serde_json` and the
//! file system convert automatically through `From`, so `?` works across
//! all of them:
//!
//! ```no_run
//! use metatable::error::Result;
//! use metatable::Table;
//!
//! fn reload(path: &str) -> Result<usize> {
//!     let table = Table::read_feather(path)?;
//!     Ok(table.height())
//! }
//! ```
//!
//! The `ResultExt` trait adds `.context()` for attaching a message to an error
//! while keeping the original cause in the text.

use std::fmt;

/// Main error type for metatable operations.
#[derive(Debug)]
pub enum CatalogError {
    /// I/O errors (data file or sidecar)
    Io(std::io::Error),

    /// Errors raised by the tabular engine
    DataProcessing(String),

    /// Malformed JSON in a metadata document
    Json(String),

    /// A sidecar document (or the schema itself) failed schema validation
    SchemaValidation(String),

    /// A column name that is not part of the table
    ColumnNotFound(String),

    /// Attempt to persist a table without columns
    EmptyTable,

    /// File extension that maps to no supported encoding
    UnsupportedFormat(String),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::SchemaValidation(msg) => write!(f, "Schema validation failed: {msg}"),
            Self::ColumnNotFound(name) => write!(f, "Column not found: '{name}'"),
            Self::EmptyTable => write!(f, "Cannot save a table with no columns"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file format: '{ext}'"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<polars::error::PolarsError> for CatalogError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

/// Result type alias for metatable operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

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
    E: Into<CatalogError>,
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

// Keeps the variant for errors callers are expected to match on.
fn wrap(msg: String, err: CatalogError) -> CatalogError {
    match err {
        CatalogError::Io(e) => {
            CatalogError::Io(std::io::Error::new(e.kind(), format!("{msg}: {e}")))
        }
        CatalogError::SchemaValidation(inner) => {
            CatalogError::SchemaValidation(format!("{msg}: {inner}"))
        }
        CatalogError::EmptyTable | CatalogError::ColumnNotFound(_) => err,
        other => CatalogError::Other(format!("{msg}: {other}")),
    }
}
