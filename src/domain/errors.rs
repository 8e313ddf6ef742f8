//! Domain error types
//!
//! This module defines the error hierarchy for Object Tracker.
//! All errors are domain-specific and don't expose third-party types.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Main Object Tracker error type
///
/// This is the primary error type used throughout the application.
/// Variants map onto the three failure domains of an export run:
/// whole-run fatal, per-object recoverable and post-export VCS failures.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Output directory already exists and overwrite is disabled
    #[error("Directory: {} exists, aborting", path.display())]
    DirectoryExists { path: PathBuf },

    /// A schema, object type or object name cannot be used as a path segment
    #[error("Invalid path segment '{segment}': {reason}")]
    InvalidSegment { segment: String, reason: String },

    /// Schema does not exist or is not visible to the session
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Catalog query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Metadata service could not produce DDL for an object
    #[error("Cannot render DDL for {object}: {reason}")]
    ObjectNotRenderable { object: String, reason: String },

    /// Database session could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// Version control errors
    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl TrackerError {
    /// Whether this error aborts the whole run when raised outside the
    /// per-object loop.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TrackerError::InvalidSegment { .. } | TrackerError::ObjectNotRenderable { .. }
        )
    }

    /// Classifies the error for per-object failure reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            TrackerError::InvalidSegment { .. } => FailureKind::InvalidSegment,
            TrackerError::ObjectNotRenderable { .. } => FailureKind::NotRenderable,
            TrackerError::SchemaNotFound(_) | TrackerError::QueryFailed(_) => FailureKind::Query,
            TrackerError::Io(_) | TrackerError::DirectoryExists { .. } => FailureKind::Write,
            TrackerError::Connection(_) => FailureKind::Connection,
            _ => FailureKind::Unknown,
        }
    }
}

/// Version-control errors
///
/// Kept separate from [`TrackerError`] so callers can tell a failed
/// publish apart from a failed export.
#[derive(Debug, Error)]
pub enum VcsError {
    /// Clone or open of the working tree failed
    #[error("Failed to acquire working tree: {0}")]
    Acquire(String),

    /// Branch checkout or creation failed
    #[error("Failed to switch to branch '{branch}': {message}")]
    Branch { branch: String, message: String },

    /// Staging or committing failed
    #[error("Failed to commit: {0}")]
    Commit(String),

    /// Push was rejected or could not reach the remote
    #[error("Failed to push branch '{branch}': {message}")]
    Push { branch: String, message: String },

    /// Any other repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Category of a recorded per-object (or per-object-type) failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Enumeration of the object type failed
    Query,
    /// DDL could not be rendered
    NotRenderable,
    /// Object name is unsafe as a path segment
    InvalidSegment,
    /// Writing the DDL file failed
    Write,
    /// The session failed mid-run
    Connection,
    /// Anything else
    Unknown,
}

// Conversion from std::io::Error
impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TrackerError {
    fn from(err: toml::de::Error) -> Self {
        TrackerError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for TrackerError {
    fn from(err: regex::Error) -> Self {
        TrackerError::Configuration(format!("Invalid pattern: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_error_display() {
        let err = TrackerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_directory_exists_display() {
        let err = TrackerError::DirectoryExists {
            path: PathBuf::from("/tmp/output/HR"),
        };
        assert_eq!(err.to_string(), "Directory: /tmp/output/HR exists, aborting");
    }

    #[test]
    fn test_vcs_error_conversion() {
        let vcs_err = VcsError::Push {
            branch: "main".to_string(),
            message: "rejected".to_string(),
        };
        let err: TrackerError = vcs_err.into();
        assert!(matches!(err, TrackerError::Vcs(_)));
        assert!(err.to_string().contains("Failed to push branch 'main'"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TrackerError::DirectoryExists {
            path: PathBuf::from("out")
        }
        .is_fatal());
        assert!(TrackerError::Connection("down".to_string()).is_fatal());
        assert!(!TrackerError::ObjectNotRenderable {
            object: "HR.TABLE.EMP".to_string(),
            reason: "ORA-31603".to_string(),
        }
        .is_fatal());
        assert!(!TrackerError::InvalidSegment {
            segment: "../evil".to_string(),
            reason: "traversal".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_failure_kind_mapping() {
        let err = TrackerError::ObjectNotRenderable {
            object: "HR.VIEW.V".to_string(),
            reason: "dropped".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::NotRenderable);
        assert_eq!(
            TrackerError::QueryFailed("x".to_string()).kind(),
            FailureKind::Query
        );
        assert_eq!(TrackerError::Io("disk full".to_string()).kind(), FailureKind::Write);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TrackerError = io_err.into();
        assert!(matches!(err, TrackerError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TrackerError = toml_err.into();
        assert!(matches!(err, TrackerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_regex_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: TrackerError = regex_err.into();
        assert!(matches!(err, TrackerError::Configuration(_)));
    }
}
