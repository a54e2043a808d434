//! Channel bindings and sample validation.
//!
//! A [`ChannelBinding`] ties a store key to one DAC channel and the span
//! of raw values that channel accepts.  [`ChannelBinding::sample`] turns
//! whatever the store returned into a setpoint, or says why it can't.

use serde::{Deserialize, Serialize};

use crate::drivers::dac::DAC_SETPOINT_MAX;
use crate::error::SampleError;

fn default_max() -> u16 {
    DAC_SETPOINT_MAX
}

/// Association between a store key and a physical output channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Store key to `GET` each iteration.
    pub name: String,
    /// DAC channel index (0–7).
    pub channel: u8,
    /// Smallest accepted setpoint.
    #[serde(default)]
    pub min: u16,
    /// Largest accepted setpoint.
    #[serde(default = "default_max")]
    pub max: u16,
}

impl ChannelBinding {
    /// Bind `name` to `channel` with the full 16-bit range.
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel,
            min: 0,
            max: DAC_SETPOINT_MAX,
        }
    }

    /// Restrict the accepted setpoint range.
    pub fn with_range(mut self, min: u16, max: u16) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Validate a raw store reply.
    pub fn sample(&self, raw: Option<&str>) -> Result<u16, SampleError> {
        let raw = raw.ok_or(SampleError::Missing)?;
        let value = parse_unsigned(raw).ok_or(SampleError::Malformed)?;
        if value < u32::from(self.min) || value > u32::from(self.max) {
            return Err(SampleError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value as u16)
    }
}

/// Parse an unsigned integer literal: decimal, or hexadecimal with a
/// `0x`/`0X` prefix.  Surrounding ASCII whitespace is ignored.  Signs,
/// underscores and anything that overflows `u32` are rejected.
pub fn parse_unsigned(raw: &str) -> Option<u32> {
    let s = raw.trim_ascii();
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    // from_str_radix tolerates a leading '+'.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}
