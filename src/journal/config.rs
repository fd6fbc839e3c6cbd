//! Journal Configuration
//!
//! Both timings are supplied at construction. The defaults encode the
//! assumed worst-case latency between writing a revision row and setting
//! its committed flag, weighed against the cost of rescanning.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{JournalError, JournalResult};

/// Default time the poller sleeps between cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Default trailing window rescanned on every cycle.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 800;

/// Journal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Poll interval in milliseconds (default: 200)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Grace period in milliseconds (default: 800)
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl JournalConfig {
    /// Create a config with the given poll interval and the default grace period.
    pub fn with_poll_interval(poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms,
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> JournalResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| JournalError::Config(format!("Failed to read config: {}", e)))?;

        let config: JournalConfig = serde_json::from_str(&content)
            .map_err(|e| JournalError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> JournalResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(JournalError::Config("poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Grace period as a `Duration`.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
