//! Bridge configuration parameters
//!
//! All tunable parameters for the Redis → DAC bridge.
//! Defaults reproduce the lab rig: Redis on localhost, `yaw` on DAC
//! channel 2, `pitch` on DAC channel 0, ±5 V outputs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::binding::ChannelBinding;
use crate::app::ports::ConfigError;
use crate::drivers::dac::{DAC_CHANNELS, DacSpan};

/// One binding per DAC channel at most.
pub const MAX_BINDINGS: usize = DAC_CHANNELS as usize;

/// Core bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    // --- Store ---
    /// Redis connection URL
    pub store_url: String,
    /// Connect/read/write timeout for store requests (milliseconds)
    pub store_timeout_ms: u32,
    /// First reconnect delay after a dropped connection (milliseconds)
    pub reconnect_initial_ms: u32,
    /// Reconnect delay cap (milliseconds)
    pub reconnect_max_ms: u32,

    // --- Outputs ---
    /// Key → channel bindings, polled in this order
    pub bindings: heapless::Vec<ChannelBinding, MAX_BINDINGS>,
    /// Output span programmed on every bound channel
    pub dac_span: DacSpan,

    // --- Timing ---
    /// Minimum wait between loop iterations (milliseconds)
    pub poll_interval_ms: u32,
    /// Statistics report interval (seconds, 0 = only at exit)
    pub stats_interval_secs: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut bindings = heapless::Vec::new();
        let _ = bindings.push(ChannelBinding::new("yaw", 2));
        let _ = bindings.push(ChannelBinding::new("pitch", 0));

        Self {
            // Store
            store_url: "redis://127.0.0.1:6379/".into(),
            store_timeout_ms: 500,
            reconnect_initial_ms: 250,
            reconnect_max_ms: 5_000,

            // Outputs
            bindings,
            dac_span: DacSpan::Bipolar5,

            // Timing
            poll_interval_ms: 10,   // 100 Hz ceiling
            stats_interval_secs: 60, // 1/min
        }
    }
}

impl BridgeConfig {
    /// Reject invalid values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("store_url must not be empty"));
        }
        if !(10..=60_000).contains(&self.store_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "store_timeout_ms must be 10–60000",
            ));
        }
        if self.reconnect_initial_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "reconnect_initial_ms must be > 0",
            ));
        }
        if self.reconnect_max_ms < self.reconnect_initial_ms {
            return Err(ConfigError::ValidationFailed(
                "reconnect_max_ms must be >= reconnect_initial_ms",
            ));
        }
        if !(1..=10_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 1–10000",
            ));
        }
        if self.bindings.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one binding is required",
            ));
        }

        let mut seen_channels = 0u8;
        for b in &self.bindings {
            if b.name.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "binding name must not be empty",
                ));
            }
            if b.channel >= DAC_CHANNELS {
                return Err(ConfigError::ValidationFailed(
                    "binding channel must be 0–7",
                ));
            }
            if seen_channels & (1 << b.channel) != 0 {
                return Err(ConfigError::ValidationFailed(
                    "binding channels must be unique",
                ));
            }
            seen_channels |= 1 << b.channel;
            if b.min > b.max {
                return Err(ConfigError::ValidationFailed(
                    "binding min must be <= max",
                ));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.poll_interval_ms))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.store_timeout_ms))
    }

    /// `None` when periodic reporting is disabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.stats_interval_secs)))
    }
}
