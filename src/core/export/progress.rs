//! Timing and progress observation
//!
//! The orchestrator reports the start and end of every phase to an
//! [`ExportObserver`]. Observer methods return nothing, so an observer
//! cannot fail a run.

use std::time::Duration;

/// Level of a timed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The whole run
    Run,
    /// One schema
    Schema,
    /// One object type within a schema
    ObjectType,
    /// One object
    Object,
    /// Working tree acquisition or publish
    Vcs,
}

/// Receives phase timings
pub trait ExportObserver: Send + Sync {
    /// A phase has started
    fn phase_started(&self, phase: Phase, label: &str);

    /// A phase has finished after `elapsed`
    fn phase_finished(&self, phase: Phase, label: &str, elapsed: Duration);
}

/// Default observer: writes each phase to the log
///
/// Run, schema and object-type phases log at info; objects log at debug
/// to keep large exports readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExportObserver for TracingObserver {
    fn phase_started(&self, phase: Phase, label: &str) {
        match phase {
            Phase::Object => tracing::debug!("{label}: started"),
            _ => tracing::info!("{label}: started"),
        }
    }

    fn phase_finished(&self, phase: Phase, label: &str, elapsed: Duration) {
        match phase {
            Phase::Object => tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "{}: Elapsed time: {:.4} seconds",
                label,
                elapsed.as_secs_f64()
            ),
            _ => crate::log_phase_elapsed!(label, elapsed),
        }
    }
}

/// Observer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {
    fn phase_started(&self, _phase: Phase, _label: &str) {}

    fn phase_finished(&self, _phase: Phase, _label: &str, _elapsed: Duration) {}
}
