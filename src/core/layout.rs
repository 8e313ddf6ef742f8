//! Output directory layout and overwrite policy
//!
//! Every object lands at `{root}/{schema}/{short_name}/{object_name}.sql`.
//! Names are used verbatim as path segments, so each one is checked before
//! it touches the file system.

use crate::domain::{DdlText, ObjectType, Result, TrackerError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File extension of exported DDL files
pub const DDL_EXTENSION: &str = "sql";

/// Check that `segment` can be used as a single path component
///
/// # Errors
///
/// Returns `TrackerError::InvalidSegment` for empty segments, path
/// separators, NUL bytes and the `.`/`..` directory references.
pub fn validate_segment(segment: &str) -> Result<&str> {
    let reason = if segment.is_empty() {
        Some("empty name")
    } else if segment.contains('/') || segment.contains('\\') {
        Some("contains a path separator")
    } else if segment.contains('\0') {
        Some("contains a NUL byte")
    } else if segment == "." || segment == ".." {
        Some("is a directory traversal sequence")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TrackerError::InvalidSegment {
            segment: segment.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(segment),
    }
}

/// Compute the output path of one object without touching the file system
///
/// # Errors
///
/// Returns `TrackerError::InvalidSegment` if any segment is unsafe.
pub fn path_for(root: &Path, schema: &str, short_name: &str, object_name: &str) -> Result<PathBuf> {
    let schema = validate_segment(schema)?;
    let short_name = validate_segment(short_name)?;
    let object_name = validate_segment(object_name)?;

    Ok(root
        .join(schema)
        .join(short_name)
        .join(format!("{object_name}.{DDL_EXTENSION}")))
}

/// Owns the output root for one run
#[derive(Debug, Clone)]
pub struct OutputLayoutManager {
    root: PathBuf,
}

impl OutputLayoutManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Prepare the output root
    ///
    /// A missing root is created. An existing root is removed and recreated
    /// empty when `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DirectoryExists` if the root exists and
    /// `overwrite` is false. Nothing is modified in that case.
    pub fn prepare_root(&self, overwrite: bool) -> Result<()> {
        clear_or_create(&self.root, overwrite)
    }

    /// Create the output root if it does not exist, leaving existing content
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Whether the root is missing or an empty directory
    pub fn root_is_vacant(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(true);
        }
        Ok(fs::read_dir(&self.root)?.next().is_none())
    }

    /// Remove everything under the root, keeping the root directory itself
    /// only when `keep_root` is set
    pub fn vacate_root(&self, keep_root: bool) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        if keep_root {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Path of a schema directory
    pub fn schema_dir(&self, schema: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_segment(schema)?))
    }

    /// Check a schema directory against the overwrite policy without
    /// modifying anything
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DirectoryExists` if the directory exists and
    /// `overwrite` is false, or `TrackerError::InvalidSegment` for an unsafe
    /// schema name.
    pub fn check_schema_dir(&self, schema: &str, overwrite: bool) -> Result<()> {
        let path = self.schema_dir(schema)?;
        if path.exists() && !overwrite {
            return Err(TrackerError::DirectoryExists { path });
        }
        Ok(())
    }

    /// Check every schema directory of a run before any of them is touched
    ///
    /// Stops at the first violation so a run either clears all its schema
    /// directories or none of them.
    pub fn preflight(&self, schemas: &[String], overwrite: bool) -> Result<()> {
        schemas
            .iter()
            .try_for_each(|schema| self.check_schema_dir(schema, overwrite))
    }

    /// Prepare one schema directory
    ///
    /// A missing directory is created. An existing one is removed and
    /// recreated empty when `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::DirectoryExists` if the directory exists and
    /// `overwrite` is false.
    pub fn prepare_schema_dir(&self, schema: &str, overwrite: bool) -> Result<PathBuf> {
        let path = self.schema_dir(schema)?;
        clear_or_create(&path, overwrite)?;
        Ok(path)
    }

    /// Ensure the directory for one object type of a schema exists
    pub fn ensure_type_dir(&self, schema: &str, object_type: ObjectType) -> Result<PathBuf> {
        let path = self
            .schema_dir(schema)?
            .join(validate_segment(object_type.short_name())?);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Output path of one object under this root
    pub fn path_for(&self, schema: &str, object_type: ObjectType, object_name: &str) -> Result<PathBuf> {
        path_for(&self.root, schema, object_type.short_name(), object_name)
    }

    /// Write DDL to `path`
    ///
    /// Missing parent directories are created. The content goes to a
    /// temporary file in the target directory that is then renamed over
    /// `path`, so readers never see a partial file.
    pub fn write(&self, path: &Path, text: &DdlText) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            TrackerError::Io(format!("Output path has no parent: {}", path.display()))
        })?;
        fs::create_dir_all(parent)?;

        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        file.persist(path)
            .map_err(|e| TrackerError::Io(format!("Failed to write {}: {}", path.display(), e.error)))?;

        tracing::trace!(path = %path.display(), bytes = text.as_bytes().len(), "DDL written");
        Ok(())
    }
}

fn clear_or_create(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() {
        if !overwrite {
            return Err(TrackerError::DirectoryExists {
                path: path.to_path_buf(),
            });
        }
        tracing::info!(path = %path.display(), "Removing existing output directory");
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case(""; "empty")]
    #[test_case("../evil"; "traversal with separator")]
    #[test_case(".."; "parent reference")]
    #[test_case("."; "current reference")]
    #[test_case("a/b"; "forward slash")]
    #[test_case("a\\b"; "backslash")]
    #[test_case("nul\0byte"; "nul byte")]
    fn test_invalid_segments_rejected(segment: &str) {
        let err = validate_segment(segment).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidSegment { .. }));
    }

    #[test_case("EMP")]
    #[test_case("EMP$HIST")]
    #[test_case("My Table")]
    #[test_case("A..B")]
    fn test_valid_segments_accepted(segment: &str) {
        assert_eq!(validate_segment(segment).unwrap(), segment);
    }

    #[test]
    fn test_path_for_layout() {
        let path = path_for(Path::new("/out"), "HR", "PACKAGE_BODY", "PAYROLL").unwrap();
        assert_eq!(path, PathBuf::from("/out/HR/PACKAGE_BODY/PAYROLL.sql"));
    }

    #[test]
    fn test_path_for_rejects_traversal_in_any_segment() {
        assert!(path_for(Path::new("/out"), "..", "TABLE", "EMP").is_err());
        assert!(path_for(Path::new("/out"), "HR", "TABLE", "../evil").is_err());
    }

    #[test]
    fn test_prepare_root_refuses_existing_without_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.sql"), "x").unwrap();

        let layout = OutputLayoutManager::new(dir.path());
        let err = layout.prepare_root(false).unwrap_err();
        assert!(matches!(err, TrackerError::DirectoryExists { .. }));
        assert!(dir.path().join("keep.sql").exists());
    }

    #[test]
    fn test_prepare_root_clears_with_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stale.sql"), "x").unwrap();

        let layout = OutputLayoutManager::new(dir.path());
        layout.prepare_root(true).unwrap();
        assert!(dir.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_prepare_schema_dir_leaves_siblings() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("HR/TABLE")).unwrap();
        fs::write(dir.path().join("HR/TABLE/OLD.sql"), "x").unwrap();
        fs::create_dir_all(dir.path().join("SALES")).unwrap();

        let layout = OutputLayoutManager::new(dir.path());
        let hr = layout.prepare_schema_dir("HR", true).unwrap();
        assert!(hr.exists());
        assert!(!hr.join("TABLE/OLD.sql").exists());
        assert!(dir.path().join("SALES").exists());
    }

    #[test]
    fn test_preflight_stops_before_any_change() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("SALES")).unwrap();

        let layout = OutputLayoutManager::new(dir.path());
        let schemas = vec!["HR".to_string(), "SALES".to_string()];
        let err = layout.preflight(&schemas, false).unwrap_err();
        assert!(matches!(err, TrackerError::DirectoryExists { ref path } if path.ends_with("SALES")));
        assert!(!dir.path().join("HR").exists());

        assert!(layout.preflight(&schemas, true).is_ok());
    }

    #[test]
    fn test_write_creates_directories_and_replaces_content() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayoutManager::new(dir.path());
        let path = layout.path_for("HR", ObjectType::Table, "EMP").unwrap();

        layout
            .write(&path, &DdlText::from_rendered("CREATE TABLE EMP (ID NUMBER);"))
            .unwrap();
        layout
            .write(&path, &DdlText::from_rendered("CREATE TABLE EMP (ID NUMBER(10));"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "CREATE TABLE EMP (ID NUMBER(10));\n"
        );
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_ensure_type_dir_uses_short_name() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayoutManager::new(dir.path());
        let path = layout.ensure_type_dir("HR", ObjectType::DatabaseLink).unwrap();
        assert!(path.ends_with("HR/DB_LINK"));
        assert!(path.is_dir());
    }

    #[test]
    fn test_vacant_root_and_vacate() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("ddl");
        let layout = OutputLayoutManager::new(&root);
        assert!(layout.root_is_vacant().unwrap());

        fs::create_dir_all(&root).unwrap();
        assert!(layout.root_is_vacant().unwrap());

        fs::create_dir_all(root.join("HR/TABLE")).unwrap();
        assert!(!layout.root_is_vacant().unwrap());

        layout.vacate_root(true).unwrap();
        assert!(root.is_dir());
        assert!(layout.root_is_vacant().unwrap());

        fs::create_dir_all(root.join(".git")).unwrap();
        layout.vacate_root(false).unwrap();
        assert!(!root.exists());
    }
}
