//! Configuration for the response client.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the per-attempt timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "CUSTOM_CF_DELIVERY_TIMEOUT_MS";
/// Environment variable overriding the attempt budget.
pub const MAX_ATTEMPTS_ENV: &str = "CUSTOM_CF_DELIVERY_MAX_ATTEMPTS";

/// Configuration for the [`crate::ResponseClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Timeout for each PUT attempt.
    #[serde(with = "duration_ms", default = "default_timeout")]
    pub timeout: Duration,

    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl DeliveryConfig {
    /// Set the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the attempt budget. Zero is raised to one.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = lookup(TIMEOUT_ENV).and_then(|v| v.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_millis(ms);
        }

        if let Some(attempts) = lookup(MAX_ATTEMPTS_ENV).and_then(|v| v.trim().parse::<u32>().ok())
        {
            config = config.max_attempts(attempts);
        }

        config
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config_error(format!("Failed to parse config: {e}")))?
        };

        let attempts = config.max_attempts;
        Ok(config.max_attempts(attempts))
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_max_attempts() -> u32 {
    5
}

/// Serialization helper for Duration as milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
