//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PhiGuardConfig;
use super::secret::secret_string;
use crate::domain::errors::PhiGuardError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "PHIGUARD";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`PhiGuardConfig`]
/// 4. Applies environment variable overrides (`PHIGUARD_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PhiGuardError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, the TOML is malformed, an override cannot be
/// parsed or validation fails.
///
/// # Examples
///
/// ```no_run
/// use phiguard::config::load_config;
///
/// let config = load_config("phiguard.toml")?;
/// println!("Retention: {} days", config.audit.retention_days);
/// # Ok::<(), phiguard::domain::PhiGuardError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PhiGuardConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PhiGuardError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PhiGuardError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text, with substitution, overrides and validation
pub fn load_config_from_str(contents: &str) -> Result<PhiGuardConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PhiGuardConfig = toml::from_str(&contents)
        .map_err(|e| PhiGuardError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PhiGuardError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PhiGuardError::Configuration(e.to_string()))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(PhiGuardError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_override<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        PhiGuardError::Configuration(format!(
            "Invalid value '{value}' for {ENV_PREFIX}_{section}_{key}: {e}"
        ))
    })
}

fn list_override(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

macro_rules! override_parsed {
    ($target:expr, $section:literal, $key:literal) => {
        if let Some(val) = env_var($section, $key) {
            $target = parse_override($section, $key, &val)?;
        }
    };
}

/// Applies environment variable overrides using the `PHIGUARD_*` prefix
///
/// Environment variables follow the pattern `PHIGUARD_<SECTION>_<KEY>`, for
/// example `PHIGUARD_AUDIT_MAX_ENTRIES` or `PHIGUARD_REVIEWER_API_KEY`. List
/// values are comma separated.
fn apply_env_overrides(config: &mut PhiGuardConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Redaction overrides
    override_parsed!(config.redaction.include_names, "REDACTION", "INCLUDE_NAMES");
    override_parsed!(
        config.redaction.include_clinical_mentions,
        "REDACTION",
        "INCLUDE_CLINICAL_MENTIONS"
    );
    if let Some(val) = env_var("REDACTION", "PATTERN_LIBRARY") {
        config.redaction.pattern_library = Some(PathBuf::from(val));
    }
    if let Some(val) = env_var("REDACTION", "EXTRA_CLINICAL_TERMS") {
        config.redaction.extra_clinical_terms = list_override(&val);
    }
    if let Some(val) = env_var("REDACTION", "EXTRA_STAFF_TITLES") {
        config.redaction.extra_staff_titles = list_override(&val);
    }

    // Reviewer overrides
    override_parsed!(config.reviewer.enabled, "REVIEWER", "ENABLED");
    if let Some(val) = env_var("REVIEWER", "ENDPOINT") {
        config.reviewer.endpoint = Some(val);
    }
    if let Some(val) = env_var("REVIEWER", "API_KEY") {
        config.reviewer.api_key = Some(secret_string(val));
    }
    override_parsed!(config.reviewer.timeout_seconds, "REVIEWER", "TIMEOUT_SECONDS");
    override_parsed!(config.reviewer.max_retries, "REVIEWER", "MAX_RETRIES");
    override_parsed!(config.reviewer.retry_backoff_ms, "REVIEWER", "RETRY_BACKOFF_MS");

    // Audit overrides
    override_parsed!(config.audit.max_entries, "AUDIT", "MAX_ENTRIES");
    override_parsed!(config.audit.retention_days, "AUDIT", "RETENTION_DAYS");
    override_parsed!(
        config.audit.prune_interval_seconds,
        "AUDIT",
        "PRUNE_INTERVAL_SECONDS"
    );
    if let Some(val) = env_var("AUDIT", "LOG_PATH") {
        config.audit.log_path = Some(PathBuf::from(val));
    }
    override_parsed!(config.audit.hash_originals, "AUDIT", "HASH_ORIGINALS");

    // Compliance overrides
    override_parsed!(
        config.compliance.failed_auth_threshold,
        "COMPLIANCE",
        "FAILED_AUTH_THRESHOLD"
    );
    override_parsed!(
        config.compliance.deletion_threshold,
        "COMPLIANCE",
        "DELETION_THRESHOLD"
    );

    // Logging overrides
    override_parsed!(config.logging.local_enabled, "LOGGING", "LOCAL_ENABLED");
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
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
        std::env::set_var("PHIGUARD_TEST_SUBST_KEY", "sk-test");
        let input = "api_key = \"${PHIGUARD_TEST_SUBST_KEY}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_key = \"sk-test\"");
        std::env::remove_var("PHIGUARD_TEST_SUBST_KEY");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PHIGUARD_TEST_MISSING_VAR");
        let input = "api_key = \"${PHIGUARD_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PHIGUARD_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("PHIGUARD_TEST_COMMENTED_VAR");
        let input = "# api_key = \"${PHIGUARD_TEST_COMMENTED_VAR}\"\nx = 1";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-phiguard.toml");
        assert!(matches!(result, Err(PhiGuardError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[redaction]
include_names = false
extra_clinical_terms = ["Glasgow Coma Scale"]

[audit]
max_entries = 500
retention_days = 30
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert!(!config.redaction.include_names);
        assert_eq!(config.audit.max_entries, 500);
        assert_eq!(config.audit.retention_days, 30);
        assert_eq!(config.reviewer.timeout_seconds, 10);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let result = load_config_from_str("[audit]\nmax_entries = 1\n");
        assert!(matches!(result, Err(PhiGuardError::Configuration(_))));
    }

    #[test]
    fn test_list_override() {
        assert_eq!(
            list_override(" Midwife, ,Doula "),
            vec!["Midwife".to_string(), "Doula".to_string()]
        );
    }
}
