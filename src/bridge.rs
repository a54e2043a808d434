//! Process-level wiring: board, DAC spans, store and loop.
//!
//! `main` installs the interrupt handler first and then hands over here,
//! so a Ctrl-C at any point of startup ends in an orderly teardown.  The
//! board is owned by [`run`] and closed by `Drop` on every return path.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::adapters::board::{Board, OpenError};
use crate::adapters::redis_store::RedisStore;
use crate::app::ports::EventSink;
use crate::app::service::{ExitStatus, SamplingLoop};
use crate::config::BridgeConfig;
use crate::error::{HardwareError, driver_exit_code};
use crate::shutdown::Shutdown;

/// How a bridge run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The loop ran and reached a terminal state.
    Finished(ExitStatus),
    /// Interrupted before the loop started.
    Interrupted,
    /// The board could not be claimed.
    BoardUnavailable(OpenError),
    /// Programming the output spans failed.
    SetupFailed(HardwareError),
}

impl Outcome {
    /// Process exit status: 0 for a requested stop, otherwise the
    /// magnitude of the driver code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Finished(status) => status.exit_code(),
            Self::Interrupted => 0,
            Self::BoardUnavailable(e) => driver_exit_code(e.code()),
            Self::SetupFailed(e) => driver_exit_code(e.code()),
        }
    }
}

/// Open board `board_index`, program its spans, connect the store and run
/// the sampling loop until `shutdown` fires or the board fails.
///
/// Only an unusable store URL is returned as `Err`; every driver failure
/// is an [`Outcome`] carrying its code.
pub fn run(
    config: &BridgeConfig,
    board_index: u8,
    shutdown: &Shutdown,
    sink: &mut impl EventSink,
) -> Result<Outcome> {
    let mut board = match Board::open(board_index) {
        Ok(board) => board,
        Err(e) => return Ok(Outcome::BoardUnavailable(e)),
    };

    let mut sampling = SamplingLoop::new(config);
    if let Err(e) = sampling.configure_outputs(&mut board, config.dac_span) {
        return Ok(Outcome::SetupFailed(e));
    }
    if shutdown.is_triggered() {
        info!("Interrupted during startup");
        return Ok(Outcome::Interrupted);
    }

    let mut store = RedisStore::from_config(config)
        .with_context(|| format!("invalid store URL '{}'", config.store_url))?;
    if let Err(e) = store.connect() {
        warn!("Redis not reachable yet ({}), will keep retrying", e);
    }
    if shutdown.is_triggered() {
        info!("Interrupted during startup");
        return Ok(Outcome::Interrupted);
    }

    info!("System ready. Entering sampling loop.");
    let status = sampling.run(&mut store, &mut board, sink, shutdown);

    // Release the store before the driver so teardown logs read in order.
    drop(store);
    drop(board);
    Ok(Outcome::Finished(status))
}
