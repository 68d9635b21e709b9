//! Service plan construction. Pure functions, no I/O, no async.

use std::collections::BTreeMap;

use caddy_common::{Layer, Override, ServicePlan, ServiceSpec, Startup};

use crate::domain::config::DesiredConfig;

/// Name of the single managed service.
pub const SERVICE_NAME: &str = "caddy";

/// Label of the layer the operator owns in the service manager.
pub const LAYER_LABEL: &str = "caddy";

/// Path of the Caddyfile inside the workload container.
pub const CADDYFILE_PATH: &str = "/etc/caddy/Caddyfile";

/// Port the workload listens on and announces to ingress.
pub const SERVICE_PORT: u16 = 8080;

const LAYER_SUMMARY: &str = "caddy layer";
const LAYER_DESCRIPTION: &str = "pebble config layer for caddy";

/// Build the desired plan for `cfg`.
///
/// Always exactly one service with `override: replace`, so re-applying the
/// layer never merges stale fields from a previous revision. Every input
/// that changes the rendered Caddyfile also appears in the environment,
/// which makes a config change visible as a plan change.
#[must_use]
pub fn build_plan(cfg: &DesiredConfig) -> ServicePlan {
    let mut environment = BTreeMap::new();
    environment.insert("hostname".to_string(), cfg.hostname.clone());
    environment.insert("FILE_SERVER".to_string(), cfg.file_server.to_string());
    environment.insert("BROWSE".to_string(), cfg.browseable.to_string());

    let spec = ServiceSpec {
        override_policy: Override::Replace,
        summary: SERVICE_NAME.to_string(),
        command: format!("caddy run --config {CADDYFILE_PATH} --adapter caddyfile"),
        startup: Startup::Enabled,
        environment,
    };
    ServicePlan::new().with_service(SERVICE_NAME, spec)
}

/// Wrap a plan in the operator's layer metadata.
#[must_use]
pub fn layer(plan: &ServicePlan) -> Layer {
    Layer {
        summary: LAYER_SUMMARY.to_string(),
        description: LAYER_DESCRIPTION.to_string(),
        services: plan.services.clone(),
    }
}
