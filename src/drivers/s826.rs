//! Sensoray 826 driver bindings.
//!
//! Thin wrappers over the vendor `826_64` library.  Every call returns the
//! driver's status code mapped through [`HardwareError::check`].
//!
//! ## Dual-target design
//!
//! With the `s826` feature: calls into the vendor library.
//! Without it: the board-detection helpers below still compile so the
//! simulated board and the tests can share them.

use crate::error::HardwareError;

/// Highest board number the driver can report.
pub const MAX_BOARDS: u8 = 16;

/// Bitmask returned by `S826_SystemOpen`: bit *n* set means board *n* was
/// detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardFlags(pub u32);

impl BoardFlags {
    pub const fn contains(self, board: u8) -> bool {
        board < MAX_BOARDS && self.0 & (1 << board) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Board numbers present in the mask, ascending.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..MAX_BOARDS).filter(move |b| self.contains(*b))
    }
}

/// Interpret the return value of `S826_SystemOpen`: negative values are
/// errors, anything else is the detected-board bitmask.
pub fn open_result(raw: i32) -> Result<BoardFlags, HardwareError> {
    if raw < 0 {
        // A negative raw value is never 0, so from_code always yields Some.
        Err(HardwareError::from_code(raw).unwrap_or(HardwareError::Unknown(raw)))
    } else {
        Ok(BoardFlags(raw as u32))
    }
}

#[cfg(feature = "s826")]
mod ffi {
    #[allow(non_snake_case)]
    #[link(name = "826_64")]
    unsafe extern "C" {
        pub fn S826_SystemOpen() -> i32;
        pub fn S826_SystemClose() -> i32;
        pub fn S826_DacRangeWrite(board: u32, chan: u32, range: u32, safemode: u32) -> i32;
        pub fn S826_DacDataWrite(board: u32, chan: u32, setpoint: u32, safemode: u32) -> i32;
    }
}

/// Writes go to the running-mode registers, never the safemode copies.
#[cfg(feature = "s826")]
const RUNMODE: u32 = 0;

/// Open the driver and enumerate boards.
#[cfg(feature = "s826")]
pub fn system_open() -> Result<BoardFlags, HardwareError> {
    // SAFETY: no arguments; the driver serialises its own state.
    open_result(unsafe { ffi::S826_SystemOpen() })
}

/// Close the driver.  Safe to call after a failed open.
#[cfg(feature = "s826")]
pub fn system_close() {
    // SAFETY: as above.
    let rc = unsafe { ffi::S826_SystemClose() };
    if let Err(e) = HardwareError::check(rc) {
        log::warn!("S826_SystemClose: {}", e);
    }
}

#[cfg(feature = "s826")]
pub fn dac_range_write(board: u8, channel: u8, range: u32) -> Result<(), HardwareError> {
    // SAFETY: plain integer arguments; the driver validates board/channel.
    HardwareError::check(unsafe {
        ffi::S826_DacRangeWrite(u32::from(board), u32::from(channel), range, RUNMODE)
    })
}

#[cfg(feature = "s826")]
pub fn dac_data_write(board: u8, channel: u8, setpoint: u16) -> Result<(), HardwareError> {
    // SAFETY: plain integer arguments; the driver validates board/channel.
    HardwareError::check(unsafe {
        ffi::S826_DacDataWrite(
            u32::from(board),
            u32::from(channel),
            u32::from(setpoint),
            RUNMODE,
        )
    })
}
