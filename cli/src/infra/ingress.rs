//! HTTP implementation of the `IngressPublisher` port.

use std::time::Duration;

use anyhow::{Context, Result};
use caddy_common::IngressRequest;

use crate::application::ports::IngressPublisher;

/// POSTs ingress requests as JSON to a fixed endpoint.
pub struct HttpIngressPublisher {
    url: Option<String>,
    timeout: Duration,
}

impl HttpIngressPublisher {
    /// `url = None` disables publishing.
    #[must_use]
    pub fn new(url: Option<String>, timeout: Duration) -> Self {
        Self {
            url: url.filter(|u| !u.trim().is_empty()),
            timeout,
        }
    }
}

impl IngressPublisher for HttpIngressPublisher {
    async fn publish(&self, request: &IngressRequest) -> Result<bool> {
        let Some(url) = self.url.clone() else {
            return Ok(false);
        };
        let body = serde_json::to_string(request).context("serializing ingress request")?;
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            match agent
                .post(&url)
                .set("Content-Type", "application/json")
                .set("User-Agent", "caddy-operator")
                .send_string(&body)
            {
                Ok(_) => Ok(true),
                Err(ureq::Error::Status(code, _)) => {
                    anyhow::bail!("ingress endpoint {url} rejected request: HTTP {code}")
                }
                Err(e) => Err(anyhow::Error::new(e)
                    .context(format!("cannot reach ingress endpoint {url}"))),
            }
        })
        .await
        .context("ingress publish task panicked")?
    }
}
