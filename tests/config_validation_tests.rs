//! Config Validation Tests
//!
//! Typo detection for unknown keys, range validation, and file loading.
//! These exercise the config layer independently from the engine and API.

use oee_analytics::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use oee_analytics::config::{ConfigError, OeeConfig};
use oee_analytics::Interval;
use std::io::Write;

// ============================================================================
// Typo Detection Tests
// ============================================================================

#[test]
fn typo_in_engine_key_warns_with_suggestion() {
    let toml_str = r#"
[engine]
asumed_efficiency_percent = 75.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("asumed_efficiency_percent"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("engine.assumed_efficiency_percent")
    );
}

#[test]
fn typo_in_server_section_warns() {
    let toml_str = r#"
[server]
adr = "127.0.0.1:9000"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("server.addr"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[server]
addr = "0.0.0.0:9090"

[storage]
path = "/var/lib/oee/records.db"

[engine]
assumed_efficiency_percent = 85.0
default_start = "2024-01-01T00:00:00Z"
default_interval = "hourly"
max_periods = 5000
parallel_min_periods = 32

[logging]
json = true
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn unknown_section_warns() {
    let toml_str = r#"
[dashboard]
theme = "dark"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "dashboard"));
}

#[test]
fn known_keys_set_is_complete() {
    let toml_str = OeeConfig::default()
        .to_toml()
        .expect("Default config should serialize");
    let warnings = validate_unknown_keys(&toml_str);
    assert!(
        warnings.is_empty(),
        "Default config serialization should produce 0 unknown-key warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert!(suggest_correction("zzz_completely_invalid_xyz_12345", &known).is_none());
}

// ============================================================================
// Range Validation Tests
// ============================================================================

#[test]
fn efficiency_above_100_is_error() {
    let mut config = OeeConfig::default();
    config.engine.assumed_efficiency_percent = 120.0;
    let errors = validate_ranges(&config);
    assert!(errors.iter().any(|e| e.contains("assumed_efficiency_percent")));
}

#[test]
fn zero_max_periods_is_error() {
    let mut config = OeeConfig::default();
    config.engine.max_periods = 0;
    assert!(validate_ranges(&config)
        .iter()
        .any(|e| e.contains("max_periods")));
}

#[test]
fn unparsable_default_start_is_error() {
    let mut config = OeeConfig::default();
    config.engine.default_start = "last tuesday".to_string();
    assert!(validate_ranges(&config)
        .iter()
        .any(|e| e.contains("default_start")));
}

#[test]
fn default_config_has_no_range_errors() {
    assert!(validate_ranges(&OeeConfig::default()).is_empty());
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_from_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[engine]\ndefault_interval = \"weekly\"\nassumed_efficiency_percent = 70.0"
    )
    .unwrap();

    let config = OeeConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.engine.default_interval, Interval::Weekly);
    assert_eq!(config.engine.assumed_efficiency_percent, 70.0);
    assert_eq!(config.engine.max_periods, OeeConfig::default().engine.max_periods);
}

#[test]
fn explicit_file_with_bad_range_is_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\nmax_periods = 0").unwrap();
    assert!(matches!(
        OeeConfig::load(Some(file.path())),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn explicit_file_with_bad_syntax_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine\nmax_periods = ").unwrap();
    match OeeConfig::load(Some(file.path())) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_explicit_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        OeeConfig::load(Some(&missing)),
        Err(ConfigError::Io { .. })
    ));
}
