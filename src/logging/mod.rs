//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels (`LOGGING_LEVEL`, `--log-level` or `RUST_LOG`)
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use object_tracker::logging::init_logging;
//! use object_tracker::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the elapsed time of a named phase
///
/// # Example
///
/// ```no_run
/// use object_tracker::log_phase_elapsed;
/// use std::time::Duration;
///
/// log_phase_elapsed!("Schema: HR", Duration::from_millis(1250));
/// ```
#[macro_export]
macro_rules! log_phase_elapsed {
    ($label:expr, $elapsed:expr) => {
        tracing::info!(
            elapsed_ms = $elapsed.as_millis() as u64,
            "{}: Elapsed time: {:.4} seconds",
            $label,
            $elapsed.as_secs_f64()
        )
    };
}

/// Log a recoverable per-object failure
///
/// # Example
///
/// ```no_run
/// use object_tracker::log_object_failure;
/// use object_tracker::domain::{ObjectRef, ObjectType, TrackerError};
///
/// let object = ObjectRef::new("HR", ObjectType::View, "V_STALE");
/// let error = TrackerError::ObjectNotRenderable {
///     object: object.to_string(),
///     reason: "ORA-31603".to_string(),
/// };
/// log_object_failure!(&object, &error);
/// ```
#[macro_export]
macro_rules! log_object_failure {
    ($object:expr, $error:expr) => {
        tracing::warn!(
            object = %$object,
            kind = ?$error.kind(),
            error = %$error,
            "Object export failed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use object_tracker::log_error_with_context;
/// use object_tracker::domain::TrackerError;
///
/// let error = TrackerError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
