//! Board-level drivers: vendor bindings and DAC helpers.

pub mod dac;
pub mod s826;
