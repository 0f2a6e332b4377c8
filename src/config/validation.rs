//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Unknown keys are found by walking the raw `toml::Value` tree before serde
//! deserialization and only ever produce warnings. Range checks run on the
//! deserialized config and are fatal.

use chrono::DateTime;
use std::collections::HashSet;

use super::OeeConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of [`OeeConfig`].
///
/// Maintained by hand; a new config field must be listed here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "server",
        "server.addr",
        "storage",
        "storage.path",
        "engine",
        "engine.assumed_efficiency_percent",
        "engine.default_start",
        "engine.default_interval",
        "engine.max_periods",
        "engine.parallel_min_periods",
        "logging",
        "logging.json",
    ];
    keys.iter().copied().collect()
}

/// Collect dotted key paths from a TOML value tree.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, ties broken alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Entry Points
// ============================================================================

/// Warnings for every unknown key in a raw TOML document.
///
/// Parse errors yield no warnings here; serde reports them afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

/// Fatal range errors for a parsed config.
pub fn validate_ranges(config: &OeeConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let engine = &config.engine;

    if !(0.0..=100.0).contains(&engine.assumed_efficiency_percent) {
        errors.push(format!(
            "engine.assumed_efficiency_percent ({}) must be within 0..=100",
            engine.assumed_efficiency_percent
        ));
    }
    if engine.max_periods == 0 {
        errors.push("engine.max_periods must be > 0".to_string());
    }
    if engine.parallel_min_periods == 0 {
        errors.push("engine.parallel_min_periods must be > 0".to_string());
    }
    if DateTime::parse_from_rfc3339(&engine.default_start).is_err() {
        errors.push(format!(
            "engine.default_start ('{}') is not an RFC 3339 instant",
            engine.default_start
        ));
    }
    if config.server.addr.trim().is_empty() {
        errors.push("server.addr must not be empty".to_string());
    }

    errors
}
