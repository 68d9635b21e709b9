//! Desired workload configuration and its key/value parsing.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const KEY_HOSTNAME: &str = "hostname";
pub const KEY_FILE_SERVER: &str = "file-server";
pub const KEY_BROWSEABLE: &str = "browseable";

pub const DEFAULT_HOSTNAME: &str = "caddy";

const TRUE_WORDS: &[&str] = &["true", "yes", "on", "enabled"];
const FALSE_WORDS: &[&str] = &["false", "no", "off", "disabled"];

// ── Config snapshot ──────────────────────────────────────────────────────────

/// Immutable snapshot of the inputs that drive one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DesiredConfig {
    /// Site address served by the workload.
    pub hostname: String,
    /// Serve static files from the site root.
    pub file_server: bool,
    /// Allow directory listings when serving files.
    pub browseable: bool,
}

impl Default for DesiredConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            file_server: false,
            browseable: false,
        }
    }
}

impl DesiredConfig {
    /// Build a snapshot from a raw key/value set.
    ///
    /// Missing keys take their defaults and unknown keys are ignored. The
    /// hostname is not validated here; the renderer rejects values that
    /// would corrupt the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if a key holds a value of the wrong shape.
    pub fn from_values(values: &BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(value) = values.get(KEY_HOSTNAME) {
            cfg.hostname = parse_string(KEY_HOSTNAME, value)?;
        }
        if let Some(value) = values.get(KEY_FILE_SERVER) {
            cfg.file_server = parse_toggle(KEY_FILE_SERVER, value)?;
        }
        if let Some(value) = values.get(KEY_BROWSEABLE) {
            cfg.browseable = parse_toggle(KEY_BROWSEABLE, value)?;
        }
        Ok(cfg)
    }
}

// ── Parsers ──────────────────────────────────────────────────────────────────

fn parse_string(key: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(invalid(key, other, "a string")),
    }
}

/// Accepts a YAML bool or one of the toggle words, case-insensitively.
/// A null value means "unset" and yields `false`.
fn parse_toggle(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(s) => {
            let word = s.trim().to_ascii_lowercase();
            if TRUE_WORDS.contains(&word.as_str()) {
                Ok(true)
            } else if FALSE_WORDS.contains(&word.as_str()) {
                Ok(false)
            } else {
                Err(invalid(key, value, &toggle_words()))
            }
        }
        other => Err(invalid(key, other, &toggle_words())),
    }
}

fn toggle_words() -> String {
    TRUE_WORDS
        .iter()
        .chain(FALSE_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn invalid(key: &str, value: &Value, valid: &str) -> ConfigError {
    let shown = serde_yaml::to_string(value)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "<unprintable>".to_string());
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: shown,
        valid: valid.to_string(),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
