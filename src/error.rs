//! Error types for the bridge.
//!
//! Every failure the sampling loop can observe falls into one of three
//! families: the store could not answer, the answer was not a usable
//! sample, or the board refused a write.  All variants are `Copy` so they
//! can be handed to the event sink and the fault recorder without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`KeyValueStore`](crate::app::ports::KeyValueStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No connection and the reconnect backoff window is still open.
    Unavailable,
    /// The connection dropped or was refused.
    ConnectionLost,
    /// The server did not answer within the configured timeout.
    Timeout,
    /// The server answered with an error reply (e.g. WRONGTYPE).
    Rejected,
}

impl StoreError {
    /// Connection-level failures are the ones a reconnect can fix.
    pub const fn is_connection_level(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "store unavailable (reconnect pending)"),
            Self::ConnectionLost => write!(f, "store connection lost"),
            Self::Timeout => write!(f, "store request timed out"),
            Self::Rejected => write!(f, "store rejected request"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Sample errors
// ---------------------------------------------------------------------------

/// Why a fetched value was not forwarded to hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    /// The key does not exist in the store.
    Missing,
    /// The value is not an unsigned integer literal.
    Malformed,
    /// The value parsed but lies outside the channel's span.
    OutOfRange { value: u32, min: u16, max: u16 },
}

impl SampleError {
    /// Range violations are recorded as validation faults; the others are
    /// plain parse failures.
    pub const fn is_validation_fault(self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "key missing"),
            Self::Malformed => write!(f, "not an unsigned integer"),
            Self::OutOfRange { value, min, max } => {
                write!(f, "value {value} outside {min}..={max}")
            }
        }
    }
}

impl std::error::Error for SampleError {}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Error codes returned by the 826 driver API, one variant per code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// Illegal board number.
    Board,
    /// Illegal argument.
    Value,
    /// Device not ready or timeout.
    NotReady,
    /// Wait cancelled.
    Cancelled,
    /// Driver call failed.
    Driver,
    /// Missed ADC trigger.
    MissedTrigger,
    /// Two boards have the same number.
    DuplicateAddress,
    /// Board not open.
    BoardClosed,
    /// Driver could not create a mutex.
    CreateMutex,
    /// Driver could not map the board.
    MemoryMap,
    /// Driver allocation failed.
    Malloc,
    /// FIFO overflow.
    FifoOverflow,
    /// Local bus error.
    LocalBus,
    /// OS-specific failure.
    OsSpecific,
    /// Code not known to this build.
    Unknown(i32),
}

impl HardwareError {
    /// Map a raw driver return code.  `0` (no error) maps to `None`.
    pub const fn from_code(code: i32) -> Option<Self> {
        let err = match code {
            0 => return None,
            -1 => Self::Board,
            -2 => Self::Value,
            -3 => Self::NotReady,
            -4 => Self::Cancelled,
            -5 => Self::Driver,
            -6 => Self::MissedTrigger,
            -9 => Self::DuplicateAddress,
            -10 => Self::BoardClosed,
            -11 => Self::CreateMutex,
            -12 => Self::MemoryMap,
            -13 => Self::Malloc,
            -15 => Self::FifoOverflow,
            -16 => Self::LocalBus,
            -100 => Self::OsSpecific,
            other => Self::Unknown(other),
        };
        Some(err)
    }

    /// Convert a driver return code into a `Result`.
    pub const fn check(code: i32) -> Result<(), Self> {
        match Self::from_code(code) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// The raw driver code for this error.
    pub const fn code(self) -> i32 {
        match self {
            Self::Board => -1,
            Self::Value => -2,
            Self::NotReady => -3,
            Self::Cancelled => -4,
            Self::Driver => -5,
            Self::MissedTrigger => -6,
            Self::DuplicateAddress => -9,
            Self::BoardClosed => -10,
            Self::CreateMutex => -11,
            Self::MemoryMap => -12,
            Self::Malloc => -13,
            Self::FifoOverflow => -15,
            Self::LocalBus => -16,
            Self::OsSpecific => -100,
            Self::Unknown(code) => code,
        }
    }

    /// Transient errors are logged and the loop keeps going; every other
    /// code stops it.
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::Cancelled | Self::MissedTrigger | Self::FifoOverflow
        )
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Board => "illegal board number",
            Self::Value => "illegal argument",
            Self::NotReady => "device not ready or timeout",
            Self::Cancelled => "wait cancelled",
            Self::Driver => "driver call failed",
            Self::MissedTrigger => "missed adc trigger",
            Self::DuplicateAddress => "two boards have same number",
            Self::BoardClosed => "board not open",
            Self::CreateMutex => "can't create mutex",
            Self::MemoryMap => "can't map board",
            Self::Malloc => "driver allocation failed",
            Self::FifoOverflow => "fifo overflow",
            Self::LocalBus => "local bus error",
            Self::OsSpecific => "os-specific driver error",
            Self::Unknown(_) => "unknown error",
        };
        write!(f, "{msg} (code {})", self.code())
    }
}

impl std::error::Error for HardwareError {}

/// Process exit status for a failing driver code: its magnitude, kept in
/// 1..=255 so a failure never reads as success.
pub fn driver_exit_code(driver_code: i32) -> u8 {
    driver_code.unsigned_abs().clamp(1, 255) as u8
}
