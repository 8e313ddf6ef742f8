//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TrackerConfig;
use super::secret::secret_string;
use crate::domain::errors::TrackerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "OBJECT_TRACKER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`TrackerConfig`]
/// 4. Applies environment variable overrides (`OBJECT_TRACKER_*` prefix)
///
/// Validation is left to the caller, because command-line flags are
/// usually layered on top of the file before the result is complete.
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails or a
/// referenced environment variable is not set.
///
/// # Examples
///
/// ```no_run
/// use object_tracker::config::load_config;
///
/// let config = load_config("object-tracker.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TrackerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TrackerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TrackerConfig = toml::from_str(&contents)
        .map_err(|e| TrackerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment variable pattern is valid")
    })
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied verbatim.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TrackerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env(key).map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            TrackerError::Configuration(format!(
                "Environment variable {ENV_PREFIX}_{key} has an invalid value: '{raw}'"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `OBJECT_TRACKER_*` prefix
///
/// Environment variables follow the pattern `OBJECT_TRACKER_<SECTION>_<KEY>`,
/// for example `OBJECT_TRACKER_EXPORT_OVERWRITE`. List values are
/// comma-separated.
pub fn apply_env_overrides(config: &mut TrackerConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Database overrides
    if let Some(val) = env("DATABASE_USERNAME") {
        config.database.username = Some(val);
    }
    if let Some(val) = env("DATABASE_PASSWORD") {
        config.database.password = Some(secret_string(val));
    }
    if let Some(val) = env("DATABASE_HOSTNAME") {
        config.database.hostname = Some(val);
    }
    if let Some(port) = env_parse("DATABASE_PORT")? {
        config.database.port = port;
    }
    if let Some(val) = env("DATABASE_SERVICE_NAME") {
        config.database.service_name = Some(val);
    }
    if let Some(val) = env("DATABASE_CLIENT_LIB_DIR") {
        config.database.client_lib_dir = Some(val);
    }

    // Export overrides
    if let Some(val) = env_list("EXPORT_SCHEMAS") {
        config.export.schemas = val;
    }
    if let Some(val) = env_list("EXPORT_OBJECT_TYPES") {
        config.export.object_types = val;
    }
    if let Some(val) = env("EXPORT_OBJECT_NAME_INCLUDE_PATTERN") {
        config.export.object_name_include_pattern = val;
    }
    if let Some(val) = env("EXPORT_OBJECT_NAME_EXCLUDE_PATTERN") {
        config.export.object_name_exclude_pattern = Some(val);
    }
    if let Some(val) = env("EXPORT_OUTPUT_DIRECTORY") {
        config.export.output_directory = val;
    }
    if let Some(val) = env_parse("EXPORT_OVERWRITE")? {
        config.export.overwrite = val;
    }
    if let Some(val) = env("EXPORT_OVERWRITE_SCOPE") {
        config.export.overwrite_scope = val.parse().map_err(TrackerError::Configuration)?;
    }
    if let Some(val) = env_parse("EXPORT_DRY_RUN")? {
        config.export.dry_run = val;
    }

    // Git overrides
    if let Some(val) = env("GIT_REPOSITORY") {
        config.git.repository = Some(val);
    }
    if let Some(val) = env("GIT_BRANCH") {
        config.git.branch = val;
    }
    if let Some(val) = env_parse("GIT_SYNC_ON_PARTIAL_FAILURE")? {
        config.git.sync_on_partial_failure = val;
    }
    if let Some(val) = env("GIT_SSH_KEY_PATH") {
        config.git.ssh_key_path = Some(val);
    }
    if let Some(val) = env("GIT_USERNAME") {
        config.git.username = Some(val);
    }
    if let Some(val) = env("GIT_TOKEN") {
        config.git.token = Some(secret_string(val));
    }

    // Logging overrides
    if let Some(val) = env_parse("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("OT_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${OT_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("OT_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("OT_LOADER_MISSING_VAR");
        let input = "password = \"${OT_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("OT_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${OT_LOADER_COMMENTED_OUT}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${OT_LOADER_COMMENTED_OUT}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-object-tracker.toml");
        assert!(matches!(result, Err(TrackerError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[database]
username = "hr"
password = "secret"
hostname = "db.example.com"
service_name = "ORCLPDB1"

[export]
schemas = ["HR"]
object_types = ["TABLE", "PACKAGE BODY"]
object_name_exclude_pattern = "_BKUP$"
output_directory = "/tmp/ddl"
overwrite = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.port, 1521);
        assert_eq!(config.export.schemas, vec!["HR"]);
        assert_eq!(config.export.object_types, vec!["TABLE", "PACKAGE BODY"]);
        assert!(config.export.overwrite);
        assert!(config.validate().is_ok());
    }
}
