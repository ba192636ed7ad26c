//! # Announcer Configuration

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::AnnouncerError;

/// Default label of an announcer in logs.
pub const DEFAULT_ANNOUNCER_NAME: &str = "announcer";

/// Announcer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Label used in log records and the spy's rendering.
    pub name: String,

    /// Prune weak subscriptions whose target was dropped on every delivery
    /// snapshot. When off, only an explicit `reclaim()` removes them.
    pub reclaim_on_deliver: bool,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ANNOUNCER_NAME.to_string(),
            reclaim_on_deliver: true,
        }
    }
}

impl AnnouncerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANNOUNCER_NAME`: Label in logs (default: announcer)
    /// - `ANNOUNCER_RECLAIM_ON_DELIVER`: Prune dead weak subscriptions while
    ///   delivering (default: true)
    pub fn from_env() -> Self {
        Self {
            name: env::var("ANNOUNCER_NAME")
                .unwrap_or_else(|_| DEFAULT_ANNOUNCER_NAME.to_string()),

            reclaim_on_deliver: env::var("ANNOUNCER_RECLAIM_ON_DELIVER")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_reclaim_on_deliver(mut self, enabled: bool) -> Self {
        self.reclaim_on_deliver = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), AnnouncerError> {
        if self.name.trim().is_empty() {
            return Err(AnnouncerError::Configuration(
                "announcer name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
