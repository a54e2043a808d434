//! NRC bridge library.
//!
//! Exposes the sampling loop, its ports and adapters for the binary and
//! for integration testing.  The vendor driver is only linked when the
//! `s826` feature is enabled; otherwise the board adapter simulates it.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod faults;
pub mod fsm;
pub mod shutdown;
