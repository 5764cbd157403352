//! Domain-level error types for session-stash.
//!
//! All errors are typed with `thiserror` and carry enough context to be
//! printed directly to the user by `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Alias is not present in the registry.
    #[error("Session '{alias}' not found")]
    NotFound { alias: String },

    /// The alias resolves, but no log file exists for its identifier.
    #[error("Session file for '{alias}' (ID: {session_id}) not found")]
    SessionFileMissing { alias: String, session_id: String },

    /// Archive path does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Archive exists but is not a usable export file.
    #[error("Invalid export file: {message}")]
    InvalidArchive { message: String },

    /// Nothing registered, so nothing to export.
    #[error("No sessions to export")]
    EmptyRegistry,

    /// Registry has entries but none of them resolved to a session file.
    #[error("No session files found to export")]
    NothingToExport,

    /// No session log files exist under the projects directory.
    #[error("No session files found under {}", path.display())]
    NoSessionFiles { path: PathBuf },

    /// JSON serialization or parsing failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Zip container operation failed.
    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: Option<zip::result::ZipError>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an archive error from a zip error, with context.
    pub fn archive(message: impl Into<String>, err: zip::result::ZipError) -> Self {
        Self::Archive {
            message: format!("{}: {err}", message.into()),
            source: Some(err),
        }
    }

    /// Create an invalid-archive error.
    pub fn invalid_archive(message: impl Into<String>) -> Self {
        Self::InvalidArchive {
            message: message.into(),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_cli_output() {
        let err = AppError::NotFound {
            alias: "work".into(),
        };
        assert_eq!(err.to_string(), "Session 'work' not found");

        let err = AppError::SessionFileMissing {
            alias: "work".into(),
            session_id: "abc123".into(),
        };
        assert_eq!(
            err.to_string(),
            "Session file for 'work' (ID: abc123) not found"
        );

        let err = AppError::invalid_archive("missing or invalid manifest.json");
        assert_eq!(
            err.to_string(),
            "Invalid export file: missing or invalid manifest.json"
        );
    }
}
