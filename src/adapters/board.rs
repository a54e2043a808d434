//! Board adapter: bridges the 826 DAC outputs to the [`OutputWriter`] port.
//!
//! Opening a [`Board`] opens the vendor driver and checks that the wanted
//! board number was detected.  Dropping it closes the driver, so the board
//! is released on every exit path of `main`.
//!
//! ## cfg gating
//!
//! - **feature `s826`**: real driver calls via [`crate::drivers::s826`].
//! - **otherwise**: an in-memory simulation that reports board 0 as present
//!   and remembers the last setpoint written to each channel.

use core::fmt;

use log::info;
#[cfg(not(feature = "s826"))]
use log::debug;

use crate::app::ports::OutputWriter;
use crate::drivers::dac::{DAC_CHANNELS, DacSpan};
use crate::drivers::s826::BoardFlags;
use crate::error::HardwareError;

// ───────────────────────────────────────────────────────────────
// Open errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    /// The driver itself failed to open.
    Driver(HardwareError),
    /// The driver opened but the requested board was not detected.
    NotFound { board: u8, detected: BoardFlags },
}

impl OpenError {
    /// Driver error code to report as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            Self::Driver(e) => e.code(),
            Self::NotFound { .. } => HardwareError::Board.code(),
        }
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(e) => write!(f, "driver open failed: {e}"),
            Self::NotFound { board, .. } => write!(f, "target board of index {board} not found"),
        }
    }
}

impl std::error::Error for OpenError {}

// ───────────────────────────────────────────────────────────────
// Board
// ───────────────────────────────────────────────────────────────

/// Boards reported by the simulated driver.
#[cfg(not(feature = "s826"))]
const SIM_DETECTED: BoardFlags = BoardFlags(0b1);

/// An open 826 board.
pub struct Board {
    index: u8,
    spans: [Option<DacSpan>; DAC_CHANNELS as usize],
    #[cfg(not(feature = "s826"))]
    setpoints: [Option<u16>; DAC_CHANNELS as usize],
}

impl Board {
    /// Open the driver and claim board `index`.
    pub fn open(index: u8) -> Result<Self, OpenError> {
        let detected = match Self::platform_open() {
            Ok(flags) => flags,
            Err(e) => {
                Self::platform_close();
                return Err(OpenError::Driver(e));
            }
        };
        if !detected.contains(index) {
            Self::platform_close();
            return Err(OpenError::NotFound {
                board: index,
                detected,
            });
        }

        info!("Board {}: opened", index);
        Ok(Self {
            index,
            spans: [None; DAC_CHANNELS as usize],
            #[cfg(not(feature = "s826"))]
            setpoints: [None; DAC_CHANNELS as usize],
        })
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Span last programmed on `channel`, if any.
    pub fn span(&self, channel: u8) -> Option<DacSpan> {
        self.spans.get(channel as usize).copied().flatten()
    }

    /// Last setpoint written to `channel` (simulation only).
    #[cfg(not(feature = "s826"))]
    pub fn setpoint(&self, channel: u8) -> Option<u16> {
        self.setpoints.get(channel as usize).copied().flatten()
    }

    fn check_channel(channel: u8) -> Result<usize, HardwareError> {
        if channel < DAC_CHANNELS {
            Ok(channel as usize)
        } else {
            Err(HardwareError::Value)
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(feature = "s826")]
    fn platform_open() -> Result<BoardFlags, HardwareError> {
        crate::drivers::s826::system_open()
    }

    #[cfg(not(feature = "s826"))]
    fn platform_open() -> Result<BoardFlags, HardwareError> {
        info!("Board(sim): driver open, detected=0b{:b}", SIM_DETECTED.0);
        Ok(SIM_DETECTED)
    }

    #[cfg(feature = "s826")]
    fn platform_close() {
        crate::drivers::s826::system_close();
    }

    #[cfg(not(feature = "s826"))]
    fn platform_close() {
        info!("Board(sim): driver closed");
    }

    #[cfg(feature = "s826")]
    fn platform_range_write(&mut self, channel: u8, span: DacSpan) -> Result<(), HardwareError> {
        crate::drivers::s826::dac_range_write(self.index, channel, span.code())
    }

    #[cfg(not(feature = "s826"))]
    fn platform_range_write(&mut self, channel: u8, span: DacSpan) -> Result<(), HardwareError> {
        debug!("Board(sim): DAC{} range {:?}", channel, span);
        Ok(())
    }

    #[cfg(feature = "s826")]
    fn platform_data_write(&mut self, channel: u8, value: u16) -> Result<(), HardwareError> {
        crate::drivers::s826::dac_data_write(self.index, channel, value)
    }

    #[cfg(not(feature = "s826"))]
    fn platform_data_write(&mut self, channel: u8, value: u16) -> Result<(), HardwareError> {
        let idx = Self::check_channel(channel)?;
        self.setpoints[idx] = Some(value);
        if let Some(span) = self.spans[idx] {
            debug!(
                "Board(sim): DAC{} <- {} ({:.3} V)",
                channel,
                value,
                span.setpoint_to_volts(value)
            );
        } else {
            debug!("Board(sim): DAC{} <- {} (span not set)", channel, value);
        }
        Ok(())
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        Self::platform_close();
        info!("Board {}: released", self.index);
    }
}

// ── OutputWriter implementation ───────────────────────────────

impl OutputWriter for Board {
    fn configure_channel(&mut self, channel: u8, span: DacSpan) -> Result<(), HardwareError> {
        let idx = Self::check_channel(channel)?;
        self.platform_range_write(channel, span)?;
        self.spans[idx] = Some(span);
        Ok(())
    }

    fn write_channel(&mut self, channel: u8, value: u16) -> Result<(), HardwareError> {
        Self::check_channel(channel)?;
        self.platform_data_write(channel, value)
    }
}
