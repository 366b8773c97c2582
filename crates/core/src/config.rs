//! Credentials and polling configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const API_KEY_VAR: &str = "BINANCE_API_KEY";
const API_SECRET_VAR: &str = "BINANCE_API_SECRET";

/// Exchange API credentials.
///
/// Loaded from the environment at startup; absence of either variable is a
/// fatal configuration error, raised before any exchange call is attempted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Reads credentials from `BINANCE_API_KEY` / `BINANCE_API_SECRET`.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingCredentials` naming the first variable
    /// that is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredentials(API_KEY_VAR))?;
        let api_secret = env::var(API_SECRET_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredentials(API_SECRET_VAR))?;
        Ok(Self {
            api_key,
            api_secret,
        })
    }
}

/// Timing parameters for an order-monitoring loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between reconciliation cycles.
    pub interval_secs: u64,
    /// Seconds to wait after a transient query failure before retrying.
    pub error_backoff_secs: u64,
    /// Optional deadline on each individual exchange call, in seconds.
    /// Expiry is treated as a transient failure of the cycle.
    pub call_timeout_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            error_backoff_secs: 30,
            call_timeout_secs: None,
        }
    }
}

impl PollConfig {
    /// Reference timing for the synthetic OCO supervisor: two orders to
    /// check, so it polls faster than the grid.
    #[must_use]
    pub fn oco() -> Self {
        Self {
            interval_secs: 5,
            error_backoff_secs: 30,
            call_timeout_secs: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    #[must_use]
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_poll_config_matches_grid_reference_timing() {
        let config = PollConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(10));
        assert_eq!(config.error_backoff(), Duration::from_secs(30));
        assert!(config.call_timeout().is_none());
    }

    #[test]
    fn oco_poll_config_is_faster() {
        let config = PollConfig::oco();
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.error_backoff(), Duration::from_secs(30));
    }
}
