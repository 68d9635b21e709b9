//! Append-only record of observed hostnames.

use serde::{Deserialize, Serialize};

/// Ordered set of hostnames in first-seen order. Never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<String>);

impl History {
    /// Append `value` unless already present. Returns `true` if added.
    pub fn record(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}
