//! Port traits: the boundary between the sampling loop and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SamplingLoop (domain)
//! ```
//!
//! Driven adapters (Redis, the 826 board, the log) implement these traits.
//! The [`SamplingLoop`](super::service::SamplingLoop) consumes them via
//! generics, so the loop never touches a socket or a register directly and
//! can be exercised with recording fakes.

use core::fmt;

use crate::config::BridgeConfig;
use crate::drivers::dac::DacSpan;
use crate::error::{HardwareError, StoreError};

// ───────────────────────────────────────────────────────────────
// Store port (driven adapter: remote values → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the loop calls this to fetch one named value.
///
/// Connection setup and teardown belong to the adapter; the loop only
/// ever issues `get`.
pub trait KeyValueStore {
    /// `GET key`.  `Ok(None)` means the key does not exist.
    fn get(&mut self, key: &str) -> Result<Option<String>, StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the loop calls this to drive analog outputs.
///
/// The writer is used by exactly one caller for its whole lifetime, so
/// implementations need no internal locking.
pub trait OutputWriter {
    /// Program a channel's output span.  Called once per bound channel
    /// before the loop starts.
    fn configure_channel(&mut self, channel: u8, span: DacSpan) -> Result<(), HardwareError>;

    /// Write a raw setpoint to a channel.
    fn write_channel(&mut self, channel: u8, value: u16) -> Result<(), HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The loop emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent<'_>);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: file → domain)
// ───────────────────────────────────────────────────────────────

/// Loads the bridge configuration.
///
/// Implementations MUST run [`BridgeConfig::validate`] and reject invalid
/// values with [`ConfigError::ValidationFailed`], never clamp them.
pub trait ConfigPort {
    fn load(&self) -> Result<BridgeConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found at the given location.
    NotFound,
    /// The stored config could not be deserialized.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the backing store.
    IoError(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}
