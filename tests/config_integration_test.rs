//! Integration tests for configuration loading

use parking_lot::Mutex;
use phiguard::config::{load_config, load_config_from_str, PhiGuardConfig};
use phiguard::domain::PhiGuardError;
use secrecy::ExposeSecret;
use std::io::Write;
use tempfile::NamedTempFile;

// Tests in this file mutate process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const FULL_CONFIG: &str = r#"
[application]
log_level = "debug"

[redaction]
include_names = true
include_clinical_mentions = true
extra_clinical_terms = ["Apgar score"]
extra_staff_titles = ["Midwife"]

[reviewer]
enabled = true
endpoint = "https://reviewer.example.com/v1/review"
api_key = "${PHIGUARD_IT_REVIEWER_KEY}"
timeout_seconds = 20
max_retries = 2
retry_backoff_ms = 100

[audit]
max_entries = 5000
retention_days = 365
prune_interval_seconds = 600
log_path = "/var/lib/phiguard/audit.jsonl"
hash_originals = true

[compliance]
failed_auth_threshold = 3
deletion_threshold = 20

[logging]
local_enabled = true
local_path = "/var/log/phiguard"
local_rotation = "hourly"
"#;

#[test]
fn test_full_config_with_substitution() {
    let _guard = ENV_MUTEX.lock();
    std::env::set_var("PHIGUARD_IT_REVIEWER_KEY", "sk-integration");

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).unwrap();
    std::env::remove_var("PHIGUARD_IT_REVIEWER_KEY");

    assert_eq!(config.application.log_level, "debug");
    assert!(config.redaction.include_clinical_mentions);
    assert_eq!(config.redaction.extra_staff_titles, vec!["Midwife".to_string()]);
    assert!(config.reviewer.enabled);
    assert!(config.reviewer.has_credential());
    assert_eq!(
        config.reviewer.api_key.as_ref().unwrap().expose_secret().masked(),
        "sk-i****"
    );
    assert_eq!(config.reviewer.max_retries, 2);
    assert_eq!(config.audit.max_entries, 5000);
    assert_eq!(config.compliance.failed_auth_threshold, 3);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_missing_substitution_variable_is_reported() {
    let _guard = ENV_MUTEX.lock();
    std::env::remove_var("PHIGUARD_IT_REVIEWER_KEY");

    match load_config_from_str(FULL_CONFIG) {
        Err(PhiGuardError::Configuration(msg)) => {
            assert!(msg.contains("PHIGUARD_IT_REVIEWER_KEY"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_env_overrides_take_precedence() {
    let _guard = ENV_MUTEX.lock();
    std::env::set_var("PHIGUARD_AUDIT_MAX_ENTRIES", "250");
    std::env::set_var("PHIGUARD_REDACTION_EXTRA_CLINICAL_TERMS", "Apgar score, Murphy sign");
    std::env::set_var("PHIGUARD_COMPLIANCE_DELETION_THRESHOLD", "4");

    let result = load_config_from_str("[audit]\nmax_entries = 1000\n");

    std::env::remove_var("PHIGUARD_AUDIT_MAX_ENTRIES");
    std::env::remove_var("PHIGUARD_REDACTION_EXTRA_CLINICAL_TERMS");
    std::env::remove_var("PHIGUARD_COMPLIANCE_DELETION_THRESHOLD");

    let config = result.unwrap();
    assert_eq!(config.audit.max_entries, 250);
    assert_eq!(
        config.redaction.extra_clinical_terms,
        vec!["Apgar score".to_string(), "Murphy sign".to_string()]
    );
    assert_eq!(config.compliance.deletion_threshold, 4);
}

#[test]
fn test_unparseable_override_is_rejected() {
    let _guard = ENV_MUTEX.lock();
    std::env::set_var("PHIGUARD_REVIEWER_TIMEOUT_SECONDS", "soon");

    let result = load_config_from_str("");
    std::env::remove_var("PHIGUARD_REVIEWER_TIMEOUT_SECONDS");

    match result {
        Err(PhiGuardError::Configuration(msg)) => {
            assert!(msg.contains("PHIGUARD_REVIEWER_TIMEOUT_SECONDS"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let _guard = ENV_MUTEX.lock();
    let cases = [
        "[reviewer]\ntimeout_seconds = 0\n",
        "[reviewer]\nenabled = true\n",
        "[reviewer]\nenabled = true\nendpoint = \"ftp://reviewer.example.com\"\n",
        "[audit]\nretention_days = 0\n",
        "[compliance]\nfailed_auth_threshold = 0\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[application]\nlog_level = \"loud\"\n",
    ];

    for case in cases {
        assert!(
            matches!(load_config_from_str(case), Err(PhiGuardError::Configuration(_))),
            "expected rejection of {case:?}"
        );
    }
}

#[test]
fn test_defaults_are_valid() {
    let _guard = ENV_MUTEX.lock();
    assert!(PhiGuardConfig::default().validate().is_ok());

    let config = load_config_from_str("").unwrap();
    assert!(!config.reviewer.enabled);
    assert!(config.audit.hash_originals);
    assert_eq!(config.audit.retention_days, 2190);
}
