//! End-to-end runs against the simulated 826 board.
//!
//! Only built without the `s826` feature; with it the board adapter
//! talks to the real driver.

#![cfg(not(feature = "s826"))]

use crate::mock_hw::{RecordingSink, ScriptedStore, test_config};

use nrc_bridge::adapters::board::{Board, OpenError};
use nrc_bridge::adapters::log_sink::LogEventSink;
use nrc_bridge::app::service::SamplingLoop;
use nrc_bridge::drivers::dac::DacSpan;
use nrc_bridge::shutdown::Shutdown;

#[test]
fn simulated_rig_tracks_yaw_and_pitch() {
    let config = test_config(&[("yaw", 2), ("pitch", 0)]);
    let mut board = Board::open(0).unwrap();
    let mut lp = SamplingLoop::new(&config);
    lp.configure_outputs(&mut board, config.dac_span).unwrap();

    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "0xC000")
        .with_value("pitch", "16384")
        .stop_after(4, &shutdown);

    let status = lp.run(&mut store, &mut board, &mut LogEventSink::new(), &shutdown);

    assert!(status.is_success());
    assert_eq!(board.span(2), Some(DacSpan::Bipolar5));
    assert_eq!(board.span(0), Some(DacSpan::Bipolar5));
    assert_eq!(board.setpoint(2), Some(0xC000));
    assert_eq!(board.setpoint(0), Some(16384));
    assert_eq!(board.setpoint(1), None);
    assert!((DacSpan::Bipolar5.setpoint_to_volts(0xC000) - 2.5).abs() < 0.01);
}

#[test]
fn rejected_samples_leave_the_previous_setpoint() {
    let config = test_config(&[("yaw", 2)]);
    let mut board = Board::open(0).unwrap();
    let mut lp = SamplingLoop::new(&config);

    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script(
            "yaw",
            ["1234", "bogus", "99999"].map(|v| Ok(Some(v.to_string()))),
        )
        .stop_after(3, &shutdown);

    let status = lp.run(&mut store, &mut board, &mut RecordingSink::new(), &shutdown);

    assert_eq!(status.stats().writes, 1);
    assert_eq!(board.setpoint(2), Some(1234));
}

#[test]
fn missing_board_lists_detected_ones() {
    match Board::open(7) {
        Err(OpenError::NotFound { board, detected }) => {
            assert_eq!(board, 7);
            assert!(detected.contains(0));
            assert_eq!(OpenError::NotFound { board, detected }.code(), -1);
        }
        Err(other) => panic!("unexpected open error: {other}"),
        Ok(_) => panic!("board 7 should not be detected"),
    }
}
