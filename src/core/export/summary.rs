//! Export result and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::{FailureKind, ObjectRef, ObjectType, TrackerError};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one (schema, object type) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTally {
    /// Objects returned by enumeration after filtering
    pub enumerated: usize,
    /// Objects whose export was attempted
    pub attempted: usize,
    /// Objects written successfully
    pub succeeded: usize,
    /// Objects that failed
    pub failed: usize,
}

impl TypeTally {
    fn merge(&mut self, other: &TypeTally) {
        self.enumerated += other.enumerated;
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// A recorded per-object failure
#[derive(Debug, Clone, Serialize)]
pub struct ObjectFailure {
    pub object: ObjectRef,
    pub kind: FailureKind,
    pub message: String,
}

/// A failure that prevented a schema or one of its object types from
/// being enumerated
#[derive(Debug, Clone, Serialize)]
pub struct EnumerationFailure {
    pub schema: String,
    /// `None` when the whole schema was skipped
    pub object_type: Option<ObjectType>,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of the publish step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VcsStatus {
    /// Committed and pushed
    Pushed,
    /// Nothing changed since the last commit
    NoChanges,
    /// Not attempted (interrupted run or failures with publishing disabled)
    Skipped,
    /// Commit or push failed
    Failed,
}

/// Publish outcome, reported separately from the export counters
#[derive(Debug, Clone, Serialize)]
pub struct VcsOutcome {
    pub remote: String,
    pub branch: String,
    pub status: VcsStatus,
    pub commit_id: Option<String>,
    pub message: Option<String>,
}

impl VcsOutcome {
    pub fn is_failure(&self) -> bool {
        self.status == VcsStatus::Failed
    }
}

/// Aggregate result of one export run
///
/// Created empty at run start and filled in as objects are processed.
/// Partial results from independent workers can be combined with
/// [`ExportResult::merge`].
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    /// Run start time
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,

    /// Whether this was an enumerate-only run
    pub dry_run: bool,

    /// Whether the run stopped early on a shutdown signal
    pub interrupted: bool,

    /// Counters per schema, then per object type
    pub tallies: BTreeMap<String, BTreeMap<ObjectType, TypeTally>>,

    /// Per-object failures in the order they happened
    pub failures: Vec<ObjectFailure>,

    /// Schemas and object types that could not be enumerated
    pub enumeration_failures: Vec<EnumerationFailure>,

    /// Publish outcome, when publishing was configured
    pub vcs: Option<VcsOutcome>,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ExportResult {
    /// Create a new empty result
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            duration: Duration::ZERO,
            dry_run,
            interrupted: false,
            tallies: BTreeMap::new(),
            failures: Vec::new(),
            enumeration_failures: Vec::new(),
            vcs: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    fn tally_mut(&mut self, schema: &str, object_type: ObjectType) -> &mut TypeTally {
        self.tallies
            .entry(schema.to_string())
            .or_default()
            .entry(object_type)
            .or_default()
    }

    /// Counters for one schema and object type
    pub fn tally(&self, schema: &str, object_type: ObjectType) -> Option<&TypeTally> {
        self.tallies.get(schema).and_then(|types| types.get(&object_type))
    }

    /// Record the number of objects selected for a schema and object type
    pub fn record_enumerated(&mut self, schema: &str, object_type: ObjectType, count: usize) {
        self.tally_mut(schema, object_type).enumerated += count;
    }

    /// Record a successfully written object
    pub fn record_success(&mut self, object: &ObjectRef) {
        let tally = self.tally_mut(&object.schema, object.object_type);
        tally.attempted += 1;
        tally.succeeded += 1;
    }

    /// Record a failed object
    pub fn record_failure(&mut self, object: &ObjectRef, error: &TrackerError) {
        let tally = self.tally_mut(&object.schema, object.object_type);
        tally.attempted += 1;
        tally.failed += 1;
        self.failures.push(ObjectFailure {
            object: object.clone(),
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    /// Record a schema (`object_type` = `None`) or object type that could
    /// not be enumerated
    pub fn record_enumeration_failure(
        &mut self,
        schema: &str,
        object_type: Option<ObjectType>,
        error: &TrackerError,
    ) {
        if let Some(object_type) = object_type {
            self.tally_mut(schema, object_type);
        }
        self.enumeration_failures.push(EnumerationFailure {
            schema: schema.to_string(),
            object_type,
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    /// Set the publish outcome
    pub fn set_vcs_outcome(&mut self, outcome: VcsOutcome) {
        self.vcs = Some(outcome);
    }

    fn sum(&self, field: impl Fn(&TypeTally) -> usize) -> usize {
        self.tallies
            .values()
            .flat_map(|types| types.values())
            .map(field)
            .sum()
    }

    /// Total objects selected by enumeration
    pub fn total_enumerated(&self) -> usize {
        self.sum(|t| t.enumerated)
    }

    /// Total objects attempted
    pub fn total_attempted(&self) -> usize {
        self.sum(|t| t.attempted)
    }

    /// Total objects written
    pub fn total_succeeded(&self) -> usize {
        self.sum(|t| t.succeeded)
    }

    /// Total objects failed
    pub fn total_failed(&self) -> usize {
        self.sum(|t| t.failed)
    }

    /// Whether any object or object type failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.enumeration_failures.is_empty()
    }

    /// Check if the export was successful (no failures, not interrupted,
    /// publish not failed)
    pub fn is_successful(&self) -> bool {
        !self.has_failures()
            && !self.interrupted
            && !self.vcs.as_ref().map(VcsOutcome::is_failure).unwrap_or(false)
    }

    /// Combine a partial result into this one
    ///
    /// Counters are added, failure lists appended, and the longer duration
    /// and earlier start time kept.
    pub fn merge(&mut self, other: ExportResult) {
        for (schema, types) in other.tallies {
            let target = self.tallies.entry(schema).or_default();
            for (object_type, tally) in types {
                target.entry(object_type).or_default().merge(&tally);
            }
        }
        self.failures.extend(other.failures);
        self.enumeration_failures.extend(other.enumeration_failures);
        self.interrupted |= other.interrupted;
        self.dry_run |= other.dry_run;
        self.duration = self.duration.max(other.duration);
        self.started_at = self.started_at.min(other.started_at);
        if self.vcs.is_none() {
            self.vcs = other.vcs;
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            schemas = self.tallies.len(),
            enumerated = self.total_enumerated(),
            attempted = self.total_attempted(),
            succeeded = self.total_succeeded(),
            failed = self.total_failed(),
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            duration_secs = format!("{:.4}", self.duration.as_secs_f64()),
            "Export completed"
        );

        for (schema, types) in &self.tallies {
            for (object_type, tally) in types {
                tracing::debug!(
                    schema = %schema,
                    object_type = %object_type,
                    enumerated = tally.enumerated,
                    succeeded = tally.succeeded,
                    failed = tally.failed,
                    "Object type summary"
                );
            }
        }

        if self.has_failures() {
            tracing::warn!(
                object_failures = self.failures.len(),
                enumeration_failures = self.enumeration_failures.len(),
                "Export completed with errors"
            );
            for failure in &self.enumeration_failures {
                tracing::warn!(
                    schema = %failure.schema,
                    object_type = failure.object_type.map(|t| t.catalog_name()).unwrap_or("*"),
                    kind = ?failure.kind,
                    message = %failure.message,
                    "Enumeration failed"
                );
            }
            for failure in &self.failures {
                tracing::warn!(
                    object = %failure.object,
                    kind = ?failure.kind,
                    message = %failure.message,
                    "Object failed"
                );
            }
        }

        if let Some(vcs) = &self.vcs {
            tracing::info!(
                remote = %vcs.remote,
                branch = %vcs.branch,
                status = ?vcs.status,
                commit = vcs.commit_id.as_deref().unwrap_or("-"),
                "Publish result"
            );
        }
    }
}
