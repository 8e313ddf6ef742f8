//! Export orchestration
//!
//! This module provides the core export logic for Object Tracker, including:
//! - Plan resolution from configuration
//! - The orchestrator driving schemas, object types and objects
//! - Progress observation and phase timing
//! - Result aggregation and reporting

pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod summary;

pub use orchestrator::{ExportOrchestrator, RunState};
pub use plan::{ExportPlan, VcsTarget};
pub use progress::{ExportObserver, NoopObserver, Phase, TracingObserver};
pub use summary::{
    EnumerationFailure, ExportResult, ObjectFailure, TypeTally, VcsOutcome, VcsStatus,
};
