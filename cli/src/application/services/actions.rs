//! Application service: on-demand actions.
//!
//! Actions are synchronous queries. They return a JSON-serializable payload
//! or an [`ActionFailure`] message and never touch the runtime backend.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::application::ports::{ConfigSource, OperatorStateStore};
use crate::application::services::history::HistoryTracker;
use crate::domain::error::ActionFailure;
use crate::domain::fortune::{parse_fortunes, pick};

/// Payload of the `hostname` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostnameReport {
    pub current: String,
    pub history: Vec<String>,
}

/// Payload of the `fortune` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FortuneReport {
    pub fortune: String,
}

/// Report the configured hostname and every hostname seen before.
///
/// # Errors
///
/// Returns a failure message if the configuration or state cannot be read.
pub async fn hostname(
    source: &impl ConfigSource,
    store: &impl OperatorStateStore,
) -> Result<HostnameReport, ActionFailure> {
    let cfg = source
        .desired()
        .await
        .map_err(|e| ActionFailure(format!("cannot load configuration: {e:#}")))?;
    let history = HistoryTracker::new(store)
        .entries()
        .await
        .map_err(|e| ActionFailure(format!("cannot read hostname history: {e:#}")))?;
    Ok(HostnameReport {
        current: cfg.hostname,
        history,
    })
}

/// Pick a fortune from `text`. A `seed` makes the pick reproducible;
/// without one the thread-local generator is used.
///
/// # Errors
///
/// Returns a failure message if `text` contains no fortunes.
pub fn fortune(text: &str, seed: Option<u64>) -> Result<FortuneReport, ActionFailure> {
    let fortunes = parse_fortunes(text);
    let picked = match seed {
        Some(seed) => pick(&fortunes, &mut StdRng::seed_from_u64(seed)),
        None => pick(&fortunes, &mut rand::thread_rng()),
    };
    picked
        .map(|f| FortuneReport {
            fortune: f.to_string(),
        })
        .ok_or_else(|| ActionFailure("no fortunes available".to_string()))
}

