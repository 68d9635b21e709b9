use serde::Deserialize;
use std::path::PathBuf;

/// Operator runtime settings.
///
/// Loaded from `CADDY_OPERATOR_*` environment variables by the binary; every
/// field has a default so an empty environment is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSettings {
    /// Path or name of the `pebble` client binary.
    #[serde(default = "default_pebble_bin")]
    pub pebble_bin: String,

    /// Pebble state directory holding `.pebble.socket` (exported as `PEBBLE`).
    #[serde(default = "default_pebble_dir")]
    pub pebble_dir: PathBuf,

    /// Where the workload container's filesystem is mounted in the operator.
    #[serde(default = "default_container_root")]
    pub container_root: PathBuf,

    /// Directory for persisted operator state (default: `~/.caddy-operator`).
    pub state_dir: Option<PathBuf>,

    /// Endpoint receiving ingress announcements; unset disables publishing.
    pub ingress_url: Option<String>,

    /// Upper bound for each backend call, in seconds.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Caddyfile template overriding the embedded one.
    pub template: Option<PathBuf>,
}

fn default_pebble_bin() -> String {
    "pebble".to_string()
}

fn default_pebble_dir() -> PathBuf {
    PathBuf::from("/var/lib/pebble/default")
}

fn default_container_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_command_timeout_secs() -> u64 {
    10
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            pebble_bin: default_pebble_bin(),
            pebble_dir: default_pebble_dir(),
            container_root: default_container_root(),
            state_dir: None,
            ingress_url: None,
            command_timeout_secs: default_command_timeout_secs(),
            template: None,
        }
    }
}
