//! Application service: ingress announcement.

use caddy_common::IngressRequest;
use tracing::{debug, warn};

use crate::application::ports::{IngressPublisher, ProgressReporter};
use crate::domain::DesiredConfig;
use crate::domain::plan::{SERVICE_NAME, SERVICE_PORT};

/// Routing request for the current configuration.
#[must_use]
pub fn ingress_request(cfg: &DesiredConfig) -> IngressRequest {
    IngressRequest {
        service_hostname: cfg.hostname.clone(),
        service_name: SERVICE_NAME.to_string(),
        service_port: SERVICE_PORT,
    }
}

/// Publish the routing request. Failures are logged and reported as a
/// warning, never propagated. Returns `true` if a provider accepted it.
pub async fn announce(
    publisher: &impl IngressPublisher,
    cfg: &DesiredConfig,
    reporter: &impl ProgressReporter,
) -> bool {
    let request = ingress_request(cfg);
    match publisher.publish(&request).await {
        Ok(true) => {
            debug!(hostname = %request.service_hostname, "announced ingress");
            true
        }
        Ok(false) => {
            debug!("no ingress provider configured");
            false
        }
        Err(e) => {
            let cause = format!("{e:#}");
            warn!(error = %cause, "cannot announce ingress");
            reporter.warn(&format!("ingress announcement failed: {cause}"));
            false
        }
    }
}
