use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_derive::Deserialize;

use crate::error::{BridgeError, Result};

pub const DEFAULT_INTERVAL_SECS: f64 = 10.0;
pub const DEFAULT_REFRESH_MULTIPLIER: u32 = 6;
/// Longest accepted poll, refresh or timeout period. Keeps every
/// `Instant + period` computed by the poller and the loop in range.
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Settings as they come from one layer (flags, environment or config file).
/// Every field is optional so layers can be stacked with [`PartialConfig::or`].
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub verbose: Option<bool>,
    /// Replay fake grid states instead of asking the envoyproxy
    pub fake: Option<bool>,
    /// Poll period in seconds
    pub interval: Option<f64>,
    pub envoyproxy_url: Option<String>,
    pub homebridge_accessory_id: Option<String>,
    pub homebridge_webhook_url: Option<String>,
    /// Refresh every this many polls, 0 turns refreshing off
    pub refresh_multiplier: Option<u32>,
    /// Timeout for outbound HTTP calls in seconds, unset waits forever
    pub http_timeout: Option<f64>,
}

impl PartialConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: PartialConfig) -> Self {
        Self {
            verbose: self.verbose.or(fallback.verbose),
            fake: self.fake.or(fallback.fake),
            interval: self.interval.or(fallback.interval),
            envoyproxy_url: self.envoyproxy_url.or(fallback.envoyproxy_url),
            homebridge_accessory_id: self
                .homebridge_accessory_id
                .or(fallback.homebridge_accessory_id),
            homebridge_webhook_url: self
                .homebridge_webhook_url
                .or(fallback.homebridge_webhook_url),
            refresh_multiplier: self.refresh_multiplier.or(fallback.refresh_multiplier),
            http_timeout: self.http_timeout.or(fallback.http_timeout),
        }
    }

    /// Names of the required settings no layer provided. The envoyproxy URL
    /// is only required when the real source is used.
    pub fn missing(&self) -> Vec<&'static str> {
        let fake = self.fake.unwrap_or(false);
        [
            ("envoyproxy_url", !fake && self.envoyproxy_url.is_none()),
            (
                "homebridge_accessory_id",
                self.homebridge_accessory_id.is_none(),
            ),
            (
                "homebridge_webhook_url",
                self.homebridge_webhook_url.is_none(),
            ),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Where grid states are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Envoy { url: String },
    Fake,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub verbose: bool,
    pub interval: Duration,
    pub source: SourceConfig,
    pub homebridge_accessory_id: String,
    pub homebridge_webhook_url: String,
    pub refresh_multiplier: u32,
    pub http_timeout: Option<Duration>,
    refresh_interval: Option<Duration>,
}

impl TryFrom<PartialConfig> for BridgeConfig {
    type Error = BridgeError;

    fn try_from(partial: PartialConfig) -> Result<Self> {
        let missing = partial.missing();
        if !missing.is_empty() {
            return Err(BridgeError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let interval = period(
            "interval",
            partial.interval.unwrap_or(DEFAULT_INTERVAL_SECS),
        )?;
        let http_timeout = partial
            .http_timeout
            .map(|t| period("http_timeout", t))
            .transpose()?;
        let refresh_multiplier = partial
            .refresh_multiplier
            .unwrap_or(DEFAULT_REFRESH_MULTIPLIER);
        let refresh_interval = match refresh_multiplier {
            0 => None,
            n => Some(
                interval
                    .checked_mul(n)
                    .filter(|refresh| *refresh <= MAX_PERIOD)
                    .ok_or_else(|| {
                        BridgeError::Config(format!(
                            "refresh interval of {n} x {interval:?} exceeds {MAX_PERIOD:?}"
                        ))
                    })?,
            ),
        };

        let source = match (partial.fake.unwrap_or(false), partial.envoyproxy_url) {
            (false, Some(url)) => SourceConfig::Envoy { url },
            _ => SourceConfig::Fake,
        };

        Ok(Self {
            verbose: partial.verbose.unwrap_or(false),
            interval,
            source,
            homebridge_accessory_id: partial.homebridge_accessory_id.unwrap_or_default(),
            homebridge_webhook_url: partial.homebridge_webhook_url.unwrap_or_default(),
            refresh_multiplier,
            http_timeout,
            refresh_interval,
        })
    }
}

/// Converts a number of seconds into a non-zero period of at most
/// [`MAX_PERIOD`].
fn period(name: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BridgeError::Config(format!(
            "{name} must be a positive number of seconds, got {value}"
        )));
    }
    match Duration::try_from_secs_f64(value) {
        Ok(d) if d.is_zero() => Err(BridgeError::Config(format!(
            "{name} of {value}s rounds down to zero"
        ))),
        Ok(d) if d <= MAX_PERIOD => Ok(d),
        _ => Err(BridgeError::Config(format!(
            "{name} of {value}s exceeds {MAX_PERIOD:?}"
        ))),
    }
}

impl BridgeConfig {
    /// `None` when periodic refreshing is turned off.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    /// The client shared by the grid source and the webhook.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| BridgeError::Config(format!("could not build HTTP client: {e}")))
    }
}
