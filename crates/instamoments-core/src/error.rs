//! Error types module
//!
//! All errors are unified under the `AppError` enum. The pure evaluators only
//! ever return `UnknownTier` or `InvalidArgument`; the remaining variants come
//! from the collaborators (database, object storage) driven by the service layer.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

const MAX_CAUSE_DEPTH: usize = 5;

/// Severity at which a failure is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Caller mistakes: bad arguments, missing events
    Debug,
    /// Transient trouble in a backing service
    Warn,
    /// Data defects and infrastructure failures
    Error,
}

/// How an error is reported to operators and end users
pub trait ErrorMetadata {
    /// Stable code such as `UNKNOWN_TIER`, recorded in sweep reports
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same operation later may succeed
    fn is_recoverable(&self) -> bool;

    /// Message safe to show to an end user
    fn client_message(&self) -> String;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Collaborator call {operation} failed: {message}")]
    Collaborator { operation: String, message: String },

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidArgument(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidArgument(format!("UUID parsing error: {}", err))
    }
}

impl AppError {
    /// Wrap a failure from an external collaborator call
    pub fn collaborator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Collaborator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The error followed by its `source()` chain, one cause per line.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let causes = std::iter::successors(self.source(), |err: &&(dyn Error + 'static)| (*err).source());
        let mut details = self.to_string();
        for (depth, cause) in causes.enumerate() {
            if depth == MAX_CAUSE_DEPTH {
                details.push_str("\n  ...");
                break;
            }
            details.push_str(&format!("\n  caused by: {}", cause));
        }
        details
    }

    // (code, recoverable, level)
    fn metadata(&self) -> (&'static str, bool, LogLevel) {
        match self {
            AppError::UnknownTier(_) => ("UNKNOWN_TIER", false, LogLevel::Error),
            AppError::InvalidArgument(_) => ("INVALID_ARGUMENT", false, LogLevel::Debug),
            AppError::Collaborator { .. } => ("COLLABORATOR_FAILURE", true, LogLevel::Warn),
            AppError::Database(_) => ("DATABASE_ERROR", true, LogLevel::Error),
            AppError::Storage(_) => ("STORAGE_ERROR", true, LogLevel::Warn),
            AppError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
            AppError::Configuration(_) => ("CONFIGURATION_ERROR", false, LogLevel::Error),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                ("INTERNAL_ERROR", true, LogLevel::Error)
            }
        }
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        self.metadata().0
    }

    fn is_recoverable(&self) -> bool {
        self.metadata().1
    }

    fn log_level(&self) -> LogLevel {
        self.metadata().2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::UnknownTier(_) => "Event has an invalid subscription tier".to_string(),
            AppError::Collaborator { .. } => "A backing service did not respond".to_string(),
            AppError::Database(_) => "Event data is unavailable right now".to_string(),
            AppError::Storage(_) => "Media storage is unavailable right now".to_string(),
            AppError::Configuration(_) => "InstaMoments is misconfigured".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Something went wrong".to_string()
            }
        }
    }
}
