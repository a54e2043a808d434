//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules of the bridge: which keys map to which
//! DAC channels, what counts as a valid sample, and how the sampling loop
//! contains failures.  All interaction with Redis and the board happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without a server or a card.

pub mod binding;
pub mod events;
pub mod ports;
pub mod service;
