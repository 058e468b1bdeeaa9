//! Engine configuration

use crate::core::history::History;
use serde::{Deserialize, Serialize};

/// Text shown instead of the result when evaluating in override display mode
pub const DEFAULT_OVERRIDE_TOKEN: &str = "Hello World";

/// Calculator engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of history entries kept (oldest dropped first)
    pub history_capacity: usize,
    /// Display text used by `DisplayMode::Override`
    pub override_token: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: History::DEFAULT_MAX_ENTRIES,
            override_token: DEFAULT_OVERRIDE_TOKEN.to_string(),
        }
    }
}

impl EngineConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set history capacity
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the override display token
    ///
    /// An empty token would break the non-empty display invariant, so it is
    /// replaced with the default.
    #[must_use]
    pub fn with_override_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.override_token = if token.is_empty() {
            DEFAULT_OVERRIDE_TOKEN.to_string()
        } else {
            token
        };
        self
    }
}
