//! Process configuration read from the environment.
//!
//! | Variable                          | Required | Default                    |
//! |-----------------------------------|----------|----------------------------|
//! | `CO2_MONITOR_BOT_TOKEN`           | yes      |                            |
//! | `CO2_MONITOR_SENSOR_URL`          | yes      |                            |
//! | `CO2_MONITOR_API_BASE`            | no       | `https://api.telegram.org` |
//! | `CO2_MONITOR_POLL_TIMEOUT_SECS`   | no       | 60                         |
//! | `CO2_MONITOR_POLL_LIMIT`          | no       | server default             |
//! | `CO2_MONITOR_RECHECK_SECS`        | no       | 60                         |
//! | `CO2_MONITOR_ALERT_COOLDOWN_SECS` | no       | 300                        |
//! | `CO2_MONITOR_HTTP_ADDR`           | no       | status server disabled     |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::transport::TransportConfig;
use crate::updates::DEFAULT_POLL_TIMEOUT;
use crate::worker::WatchConfig;

const BOT_TOKEN_VAR: &str = "CO2_MONITOR_BOT_TOKEN";
const SENSOR_URL_VAR: &str = "CO2_MONITOR_SENSOR_URL";
const API_BASE_VAR: &str = "CO2_MONITOR_API_BASE";
const POLL_TIMEOUT_VAR: &str = "CO2_MONITOR_POLL_TIMEOUT_SECS";
const POLL_LIMIT_VAR: &str = "CO2_MONITOR_POLL_LIMIT";
const HTTP_ADDR_VAR: &str = "CO2_MONITOR_HTTP_ADDR";

/// Errors from reading the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the binary needs to run.
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: TransportConfig,
    pub poll_timeout: Duration,
    /// Maximum updates per poll; `None` leaves it to the server.
    pub poll_limit: Option<u32>,
    pub watch: WatchConfig,
    /// Address for the status server; `None` disables it.
    pub http_addr: Option<SocketAddr>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset.
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let mut transport = TransportConfig::new(require(BOT_TOKEN_VAR)?, require(SENSOR_URL_VAR)?);
        if let Some(api_base) = get(API_BASE_VAR) {
            transport = transport.with_api_base(api_base);
        }

        let poll_timeout = match get(POLL_TIMEOUT_VAR) {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid {
                    var: POLL_TIMEOUT_VAR,
                    value,
                })?,
            None => DEFAULT_POLL_TIMEOUT,
        };

        let poll_limit = get(POLL_LIMIT_VAR)
            .map(|value| match value.parse::<u32>() {
                Ok(limit) if limit > 0 => Ok(limit),
                _ => Err(ConfigError::Invalid {
                    var: POLL_LIMIT_VAR,
                    value,
                }),
            })
            .transpose()?;

        let http_addr = get(HTTP_ADDR_VAR)
            .map(|value| {
                value.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
                    var: HTTP_ADDR_VAR,
                    value,
                })
            })
            .transpose()?;

        Ok(Config {
            transport,
            poll_timeout,
            poll_limit,
            watch: WatchConfig::from_lookup(&lookup),
            http_addr,
        })
    }
}
