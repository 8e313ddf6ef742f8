//! Resolved export plan
//!
//! [`ExportPlan`] is the immutable input of an export run: configuration
//! with object types parsed, patterns compiled and defaults applied. The
//! engine never looks at the raw configuration or the environment.

use crate::config::{OverwriteScope, TrackerConfig};
use crate::core::layout::validate_segment;
use crate::core::retrieve::RenderingOptions;
use crate::domain::{ObjectType, Result, TrackerError};
use regex::Regex;
use std::path::PathBuf;

/// Where and how to publish the exported tree
#[derive(Debug, Clone)]
pub struct VcsTarget {
    pub remote_url: String,
    pub branch: String,
    /// Publish even when some objects failed
    pub sync_on_partial_failure: bool,
    pub commit_message_prefix: String,
}

impl VcsTarget {
    pub fn new(remote_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote_url: remote_url.into(),
            branch: branch.into(),
            sync_on_partial_failure: true,
            commit_message_prefix: "Object Tracker - DDL export".to_string(),
        }
    }
}

/// Fully resolved settings for one export run
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub schemas: Vec<String>,
    pub object_types: Vec<ObjectType>,
    pub include_pattern: Regex,
    pub exclude_pattern: Option<Regex>,
    pub output_root: PathBuf,
    pub overwrite: bool,
    pub overwrite_scope: OverwriteScope,
    pub dry_run: bool,
    pub vcs: Option<VcsTarget>,
    pub rendering: RenderingOptions,
}

impl ExportPlan {
    /// Plan exporting `object_types` of `schemas` into `output_root`, with
    /// a match-all include pattern and everything else at its default
    pub fn new(
        schemas: Vec<String>,
        object_types: Vec<ObjectType>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            schemas: dedup_in_order(&schemas),
            object_types: dedup_in_order(&object_types),
            include_pattern: match_all(),
            exclude_pattern: None,
            output_root: output_root.into(),
            overwrite: false,
            overwrite_scope: OverwriteScope::default(),
            dry_run: false,
            vcs: None,
            rendering: RenderingOptions::default(),
        }
    }

    pub fn with_patterns(mut self, include: Regex, exclude: Option<Regex>) -> Self {
        self.include_pattern = include;
        self.exclude_pattern = exclude;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool, scope: OverwriteScope) -> Self {
        self.overwrite = overwrite;
        self.overwrite_scope = scope;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_vcs(mut self, target: VcsTarget) -> Self {
        self.vcs = Some(target);
        self
    }

    /// Resolve a plan from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Configuration` if the configuration is invalid
    /// or a schema name cannot be used as a directory name.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        config.validate().map_err(TrackerError::Configuration)?;

        let export = &config.export;

        let schemas = dedup_in_order(&export.effective_schemas(&config.database));
        for schema in &schemas {
            validate_segment(schema).map_err(|e| TrackerError::Configuration(e.to_string()))?;
        }

        let mut object_types: Vec<ObjectType> = Vec::with_capacity(export.object_types.len());
        for raw in &export.object_types {
            let object_type: ObjectType = raw.parse().map_err(TrackerError::Configuration)?;
            if !object_types.contains(&object_type) {
                object_types.push(object_type);
            }
        }

        let include_pattern = Regex::new(&export.object_name_include_pattern)?;
        let exclude_pattern = export
            .object_name_exclude_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .transpose()?;

        let vcs = if config.git_enabled() {
            config.git.repository.as_ref().map(|remote_url| VcsTarget {
                remote_url: remote_url.trim().to_string(),
                branch: config.git.branch.clone(),
                sync_on_partial_failure: config.git.sync_on_partial_failure,
                commit_message_prefix: config.git.commit_message_prefix.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            schemas,
            object_types,
            include_pattern,
            exclude_pattern,
            output_root: PathBuf::from(&export.output_directory),
            overwrite: export.overwrite,
            overwrite_scope: export.overwrite_scope,
            dry_run: export.dry_run,
            vcs,
            rendering: RenderingOptions::default(),
        })
    }
}

/// Drop repeated entries, keeping the first occurrence of each
pub(crate) fn dedup_in_order<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

fn match_all() -> Regex {
    Regex::new(".*").expect("match-all pattern is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> TrackerConfig {
        let mut config = TrackerConfig::default();
        config.database.username = Some("hr".to_string());
        config
    }

    #[test]
    fn test_defaults_resolve() {
        let plan = ExportPlan::from_config(&base_config()).unwrap();
        assert_eq!(plan.schemas, vec!["HR"]);
        assert_eq!(plan.object_types.len(), 18);
        assert_eq!(plan.object_types[0], ObjectType::Cluster);
        assert!(plan.include_pattern.is_match("ANYTHING"));
        assert!(plan.exclude_pattern.is_none());
        assert!(!plan.overwrite);
        assert!(plan.vcs.is_none());
    }

    #[test]
    fn test_object_types_keep_order_without_duplicates() {
        let mut config = base_config();
        config.export.object_types = vec![
            "VIEW".to_string(),
            "TABLE".to_string(),
            "view".to_string(),
            "PACKAGE_BODY".to_string(),
        ];
        let plan = ExportPlan::from_config(&config).unwrap();
        assert_eq!(
            plan.object_types,
            vec![ObjectType::View, ObjectType::Table, ObjectType::PackageBody]
        );
    }

    #[test]
    fn test_repeated_schemas_collapse_to_first_occurrence() {
        let mut config = base_config();
        config.export.schemas = vec!["HR".to_string(), "SCOTT".to_string(), "HR".to_string()];
        let plan = ExportPlan::from_config(&config).unwrap();
        assert_eq!(plan.schemas, vec!["HR", "SCOTT"]);

        let plan = ExportPlan::new(
            vec!["HR".to_string(), "HR".to_string()],
            vec![ObjectType::Table, ObjectType::Table],
            "out",
        );
        assert_eq!(plan.schemas, vec!["HR"]);
        assert_eq!(plan.object_types, vec![ObjectType::Table]);
    }

    #[test]
    fn test_git_target_resolved() {
        let mut config = base_config();
        config.git.repository = Some(" git@example.com:acme/ddl.git ".to_string());
        config.git.branch = "snapshots".to_string();
        config.git.sync_on_partial_failure = false;

        let plan = ExportPlan::from_config(&config).unwrap();
        let vcs = plan.vcs.unwrap();
        assert_eq!(vcs.remote_url, "git@example.com:acme/ddl.git");
        assert_eq!(vcs.branch, "snapshots");
        assert!(!vcs.sync_on_partial_failure);
    }

    #[test]
    fn test_unsafe_schema_rejected() {
        let mut config = base_config();
        config.export.schemas = vec!["../etc".to_string()];
        let err = ExportPlan::from_config(&config).unwrap_err();
        assert!(matches!(err, TrackerError::Configuration(_)));
    }

    #[test]
    fn test_empty_exclude_pattern_is_ignored() {
        let mut config = base_config();
        config.export.object_name_exclude_pattern = Some(String::new());
        let plan = ExportPlan::from_config(&config).unwrap();
        assert!(plan.exclude_pattern.is_none());
    }
}
