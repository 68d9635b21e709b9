use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a layer's service definition combines with an existing one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    Replace,
    #[default]
    Merge,
}

/// Whether the service manager starts the service automatically
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    #[default]
    Disabled,
}

/// A single service entry of a plan.
///
/// Field names follow the service manager's layer format so a plan read back
/// from the backend compares structurally against one built locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceSpec {
    #[serde(rename = "override", default)]
    pub override_policy: Override,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub startup: Startup,
    /// Environment is a sorted map, so equality ignores insertion order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Service name to service definition.
///
/// Unknown top-level keys (layer `summary`, `description`, checks, ...) are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicePlan {
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,
}

impl ServicePlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the plan with `spec` stored under `name`, replacing any prior entry.
    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, spec: ServiceSpec) -> Self {
        self.services.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// A named configuration layer as submitted to the service manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceSpec>,
}

impl Layer {
    #[must_use]
    pub fn plan(&self) -> ServicePlan {
        ServicePlan {
            services: self.services.clone(),
        }
    }
}

/// Observed run-state of a managed service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRunState {
    /// The backend does not know the service yet.
    Absent,
    Stopped,
    Running,
}

impl fmt::Display for ServiceRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Ingress relation data published to the routing component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct IngressRequest {
    pub service_hostname: String,
    pub service_name: String,
    pub service_port: u16,
}
