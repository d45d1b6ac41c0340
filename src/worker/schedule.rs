//! Timing configuration for the sensor watch loop.
//!
//! A worker checks the sensor once per recheck delay. After raising an alert
//! it waits for the longer cooldown before checking again, so a room that
//! stays above the threshold does not flood the conversation.
//!
//! # Defaults
//!
//! - **Recheck delay**: 60 seconds (`CO2_MONITOR_RECHECK_SECS`)
//! - **Alert cooldown**: 300 seconds (`CO2_MONITOR_ALERT_COOLDOWN_SECS`)

use std::time::Duration;

/// Default delay between sensor checks (1 minute).
const DEFAULT_RECHECK_SECS: u64 = 60;

/// Default delay after an alert (5 minutes).
const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 300;

/// Timing configuration for conversation workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Delay before the first check and between checks that raise no alert.
    pub recheck_delay: Duration,

    /// Delay after a check that raised an alert.
    pub alert_cooldown: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchConfig {
    /// Creates a `WatchConfig` with default values.
    pub fn new() -> Self {
        WatchConfig {
            recheck_delay: Duration::from_secs(DEFAULT_RECHECK_SECS),
            alert_cooldown: Duration::from_secs(DEFAULT_ALERT_COOLDOWN_SECS),
        }
    }

    /// Creates a `WatchConfig` from environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a `WatchConfig` from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|s| *s > 0)
                .unwrap_or(default)
        };

        WatchConfig {
            recheck_delay: Duration::from_secs(secs(
                "CO2_MONITOR_RECHECK_SECS",
                DEFAULT_RECHECK_SECS,
            )),
            alert_cooldown: Duration::from_secs(secs(
                "CO2_MONITOR_ALERT_COOLDOWN_SECS",
                DEFAULT_ALERT_COOLDOWN_SECS,
            )),
        }
    }

    /// Delay before the next check, given whether this check alerted.
    pub fn next_delay(&self, alerted: bool) -> Duration {
        if alerted {
            self.alert_cooldown
        } else {
            self.recheck_delay
        }
    }
}
