use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use sqlx::Error as SqlxError;
use std::io::Error as IoError;

/// Prefix shared by every field validation failure.
pub const VALIDATION_PREFIX: &str = "VALIDATION/";
/// Item id did not resolve to a stored item.
pub const ITEM_NOT_FOUND: &str = "ITEM/NOT_FOUND";
/// Category id did not resolve to a stored category.
pub const CATEGORY_NOT_FOUND: &str = "CATEGORY/NOT_FOUND";
/// Category is still referenced by at least one item.
pub const CATEGORY_IN_USE: &str = "CATEGORY/IN_USE";
/// Identifier does not match the store's key format.
pub const STORE_CAST: &str = "STORE/CAST";

/// Coarse classification of an [`AppError`], used to pick a transport signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed, missing, or out-of-range input. Raised before any mutation.
    Validation,
    /// A referenced id does not resolve to a record.
    NotFound,
    /// The operation would break a business invariant.
    Conflict,
    /// The persistence layer failed or rejected the request.
    Store,
}

/// A structured application error that can be serialized and surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    /// Machine readable error code.
    pub code: String,
    /// Human friendly message that can be shown directly to the user.
    pub message: String,
    /// Arbitrary key/value pairs that provide additional context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
    /// Optional nested cause that preserves the error chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<AppError>>,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Construct a new application error with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError {
            code: code.into(),
            message: message.into(),
            context: HashMap::new(),
            cause: None,
        }
    }

    pub fn item_not_found(id: &str) -> Self {
        AppError::new(ITEM_NOT_FOUND, "The item with the given ID was not found.")
            .with_context("id", id.to_string())
    }

    pub fn category_not_found(id: &str) -> Self {
        AppError::new(
            CATEGORY_NOT_FOUND,
            "The category with the given ID was not found.",
        )
        .with_context("id", id.to_string())
    }

    pub fn category_in_use(id: &str, references: i64) -> Self {
        AppError::new(
            CATEGORY_IN_USE,
            "The category is still used by other inventory items, so it cannot be deleted.",
        )
        .with_context("id", id.to_string())
        .with_context("references", references.to_string())
    }

    /// Returns the error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the contextual metadata associated with the error.
    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Returns the nested cause if one is present.
    pub fn cause(&self) -> Option<&AppError> {
        self.cause.as_deref()
    }

    /// Classify the error by its code.
    pub fn kind(&self) -> ErrorKind {
        let code = self.code.as_str();
        if code.starts_with(VALIDATION_PREFIX) {
            ErrorKind::Validation
        } else if code.ends_with("/NOT_FOUND") {
            ErrorKind::NotFound
        } else if code.ends_with("/IN_USE") {
            ErrorKind::Conflict
        } else {
            ErrorKind::Store
        }
    }

    /// Adds a contextual key/value pair to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets the nested cause for the error.
    pub fn with_cause(mut self, cause: impl Into<AppError>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    /// Emit the error as a structured log event. Store failures log at error
    /// level; anticipated business outcomes log at warn.
    pub fn log_with_event(&self, event: &'static str) {
        match self.kind() {
            ErrorKind::Store => tracing::error!(
                target: "catalog",
                event = event,
                code = %self.code,
                message = %self.message,
                context = ?self.context
            ),
            kind => tracing::warn!(
                target: "catalog",
                event = event,
                kind = ?kind,
                code = %self.code,
                message = %self.message,
                context = ?self.context
            ),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {} ({:?})", self.code, self.message, self.context)
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<IoError> for AppError {
    fn from(error: IoError) -> Self {
        let code = format!("IO/{:?}", error.kind());
        let mut app_error = AppError::new(code, error.to_string());
        if let Some(os_code) = error.raw_os_error() {
            app_error = app_error.with_context("os_code", os_code.to_string());
        }
        app_error
    }
}

impl From<SerdeJsonError> for AppError {
    fn from(error: SerdeJsonError) -> Self {
        let code = if error.is_data() {
            "JSON/DATA"
        } else if error.is_syntax() {
            "JSON/SYNTAX"
        } else if error.is_eof() {
            "JSON/EOF"
        } else if error.is_io() {
            "JSON/IO"
        } else {
            "JSON/ERROR"
        };

        let mut app_error = AppError::new(code, error.to_string());
        let line = error.line();
        if line > 0 {
            app_error = app_error.with_context("line", line.to_string());
        }
        let column = error.column();
        if column > 0 {
            app_error = app_error.with_context("column", column.to_string());
        }
        app_error
    }
}

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match error {
            SqlxError::RowNotFound => AppError::new("SQLX/ROW_NOT_FOUND", "Record not found"),
            SqlxError::ColumnNotFound(name) => {
                AppError::new("SQLX/COLUMN_NOT_FOUND", format!("Column not found: {name}"))
            }
            SqlxError::PoolTimedOut => AppError::new(
                "SQLX/POOL_TIMEOUT",
                "Timed out acquiring a database connection",
            ),
            SqlxError::PoolClosed => AppError::new("SQLX/POOL_CLOSED", "Database pool is closed"),
            SqlxError::Io(err) => AppError::new("SQLX/IO", "Database I/O failed").with_cause(err),
            SqlxError::Database(db) => {
                let code = db
                    .code()
                    .map(|code| format!("Sqlite/{code}"))
                    .unwrap_or_else(|| "SQLX/DATABASE".to_string());
                let mut app_error = AppError::new(code, db.message().to_string());
                if let Some(constraint) = db.constraint() {
                    app_error = app_error.with_context("constraint", constraint.to_string());
                }
                app_error
            }
            SqlxError::ColumnDecode { index, source } => {
                AppError::new("SQLX/COLUMN_DECODE", source.to_string())
                    .with_context("column_index", index.to_string())
            }
            SqlxError::Decode(decode_err) => AppError::new("SQLX/DECODE", decode_err.to_string()),
            other => AppError::new("SQLX/ERROR", other.to_string()),
        }
    }
}
