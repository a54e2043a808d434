//! DAC output spans and setpoint limits for the 826 analog outputs.
//!
//! The 826 has eight 16-bit DAC channels.  Each channel's output range is
//! programmed once at startup; setpoints are then written as raw 16-bit
//! codes spanning that range.

use serde::{Deserialize, Serialize};

/// Number of analog output channels on one board.
pub const DAC_CHANNELS: u8 = 8;

/// Largest raw setpoint the DAC accepts.
pub const DAC_SETPOINT_MAX: u16 = 0xFFFF;

/// Output voltage span of a DAC channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DacSpan {
    /// 0 V to +5 V.
    Unipolar5,
    /// 0 V to +10 V.
    Unipolar10,
    /// -5 V to +5 V.
    #[default]
    Bipolar5,
    /// -10 V to +10 V.
    Bipolar10,
}

impl DacSpan {
    /// Range code understood by the driver.
    pub const fn code(self) -> u32 {
        match self {
            Self::Unipolar5 => 0,
            Self::Unipolar10 => 1,
            Self::Bipolar5 => 2,
            Self::Bipolar10 => 3,
        }
    }

    /// (min, max) output in volts.
    pub const fn volts(self) -> (f32, f32) {
        match self {
            Self::Unipolar5 => (0.0, 5.0),
            Self::Unipolar10 => (0.0, 10.0),
            Self::Bipolar5 => (-5.0, 5.0),
            Self::Bipolar10 => (-10.0, 10.0),
        }
    }

    /// Output voltage produced by `setpoint` on this span.
    pub fn setpoint_to_volts(self, setpoint: u16) -> f32 {
        let (lo, hi) = self.volts();
        lo + (hi - lo) * f32::from(setpoint) / f32::from(DAC_SETPOINT_MAX)
    }
}
