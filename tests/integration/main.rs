//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no Redis server
//! and no 826 board required.

mod board_tests;
mod sampling_loop_tests;
