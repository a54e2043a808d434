//! Integration tests for the store → SamplingLoop → DAC pipeline.
//!
//! These run on the host and drive the loop through scripted store
//! replies, checking what reaches the outputs and what gets reported.

use std::thread;
use std::time::{Duration, Instant};

use crate::mock_hw::{DacCall, MockDac, RecordingSink, ScriptedStore, Seen, test_config};

use nrc_bridge::app::service::{ExitStatus, SamplingLoop};
use nrc_bridge::config::BridgeConfig;
use nrc_bridge::drivers::dac::DacSpan;
use nrc_bridge::error::{HardwareError, SampleError, StoreError};
use nrc_bridge::fsm::LoopState;
use nrc_bridge::shutdown::Shutdown;

fn default_loop() -> SamplingLoop {
    SamplingLoop::new(&test_config(&[("yaw", 2), ("pitch", 0)]))
}

// ── Forwarding ────────────────────────────────────────────────

#[test]
fn yaw_and_pitch_reach_channels_two_and_zero() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "32768")
        .with_value("pitch", "0x4000")
        .stop_after(2, &shutdown);
    let mut dac = MockDac::new();
    let mut sink = RecordingSink::new();
    let mut lp = default_loop();

    let status = lp.run(&mut store, &mut dac, &mut sink, &shutdown);

    assert!(status.is_success());
    assert_eq!(dac.writes(), vec![(2, 32768), (0, 0x4000)]);
    assert_eq!(store.gets, vec!["yaw", "pitch"]);
    let stats = status.stats();
    assert_eq!(stats.iterations, 1);
    assert_eq!(stats.writes, 2);
    assert_eq!(lp.state(), LoopState::Stopped);
}

#[test]
fn lifecycle_events_bracket_the_run() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "1")
        .with_value("pitch", "2")
        .stop_after(4, &shutdown);
    let mut sink = RecordingSink::new();

    let status = default_loop().run(&mut store, &mut MockDac::new(), &mut sink, &shutdown);

    assert_eq!(sink.events.first(), Some(&Seen::Started { bindings: 2 }));
    assert_eq!(sink.events.last(), Some(&Seen::Stopped(status.stats())));
    assert_eq!(status.stats().iterations, 2);
}

#[test]
fn samples_are_trimmed_before_parsing() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "  42\r\n")
        .with_value("pitch", "\t0XfF ")
        .stop_after(2, &shutdown);
    let mut dac = MockDac::new();

    default_loop().run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);

    assert_eq!(dac.writes(), vec![(2, 42), (0, 255)]);
}

#[test]
fn latest_value_wins_each_iteration() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script(
            "yaw",
            ["100", "200", "300"].map(|v| Ok(Some(v.to_string()))),
        )
        .with_value("pitch", "7")
        .stop_after(6, &shutdown);
    let mut dac = MockDac::new();

    default_loop().run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);

    assert_eq!(dac.writes_to(2), vec![100, 200, 300]);
    assert_eq!(dac.writes_to(0), vec![7, 7, 7]);
}

// ── Skipped samples ───────────────────────────────────────────

#[test]
fn missing_key_skips_only_that_binding() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("pitch", "100")
        .stop_after(2, &shutdown);
    let mut dac = MockDac::new();
    let mut sink = RecordingSink::new();

    let status = default_loop().run(&mut store, &mut dac, &mut sink, &shutdown);

    assert_eq!(dac.writes(), vec![(0, 100)]);
    assert_eq!(status.stats().parse_failures, 1);
    assert!(sink.events.contains(&Seen::Rejected {
        name: "yaw".into(),
        reason: SampleError::Missing,
    }));
}

#[test]
fn malformed_values_are_never_written() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "-5")
        .with_value("pitch", "1_000")
        .stop_after(4, &shutdown);
    let mut dac = MockDac::new();

    let status = default_loop().run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);

    assert!(dac.writes().is_empty());
    assert_eq!(dac.attempts, 0);
    assert_eq!(status.stats().parse_failures, 4);
    assert_eq!(status.stats().skipped(), 4);
}

#[test]
fn out_of_range_raises_fault_once_and_clears_on_recovery() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script(
            "yaw",
            ["70000", "65536", "5"].map(|v| Ok(Some(v.to_string()))),
        )
        .with_value("pitch", "1")
        .stop_after(6, &shutdown);
    let mut dac = MockDac::new();
    let mut sink = RecordingSink::new();
    let mut lp = default_loop();

    let status = lp.run(&mut store, &mut dac, &mut sink, &shutdown);

    assert_eq!(dac.writes_to(2), vec![5]);
    assert_eq!(status.stats().validation_faults, 2);
    assert_eq!(sink.count(|e| matches!(e, Seen::FaultRaised(n) if n == "yaw")), 1);
    assert_eq!(sink.count(|e| matches!(e, Seen::FaultCleared(n) if n == "yaw")), 1);
    assert!(!lp.faults().has_faults());
    assert_eq!(lp.faults().count(0), 2);
}

#[test]
fn narrowed_range_rejects_instead_of_clamping() {
    let mut config = test_config(&[("yaw", 2)]);
    config.bindings[0].min = 1000;
    config.bindings[0].max = 2000;
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script(
            "yaw",
            ["999", "1500", "2001"].map(|v| Ok(Some(v.to_string()))),
        )
        .stop_after(3, &shutdown);
    let mut dac = MockDac::new();
    let mut lp = SamplingLoop::new(&config);

    let status = lp.run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);

    assert_eq!(dac.writes(), vec![(2, 1500)]);
    assert_eq!(status.stats().validation_faults, 2);
    assert!(lp.faults().is_faulted(0));
}

// ── Store failures ────────────────────────────────────────────

#[test]
fn store_failure_is_contained_to_its_binding() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script(
            "yaw",
            [Err(StoreError::ConnectionLost), Ok(Some("10".to_string()))],
        )
        .with_value("pitch", "20")
        .stop_after(4, &shutdown);
    let mut dac = MockDac::new();
    let mut sink = RecordingSink::new();

    let status = default_loop().run(&mut store, &mut dac, &mut sink, &shutdown);

    assert!(status.is_success());
    assert_eq!(dac.writes(), vec![(0, 20), (2, 10), (0, 20)]);
    assert_eq!(status.stats().store_failures, 1);
    assert!(sink.events.contains(&Seen::StoreFailed {
        name: "yaw".into(),
        error: StoreError::ConnectionLost,
    }));
}

#[test]
fn unreachable_store_never_ends_the_loop() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_script("yaw", [Err(StoreError::Unavailable)])
        .with_script("pitch", [Err(StoreError::Timeout)])
        .stop_after(10, &shutdown);
    let mut dac = MockDac::new();

    let status = default_loop().run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);

    assert!(status.is_success());
    assert_eq!(status.stats().iterations, 5);
    assert_eq!(status.stats().store_failures, 10);
    assert!(dac.writes().is_empty());
}

// ── Hardware failures ─────────────────────────────────────────

#[test]
fn transient_hardware_error_is_logged_and_skipped() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "11")
        .with_value("pitch", "22")
        .stop_after(4, &shutdown);
    let mut dac = MockDac::new();
    dac.fail_next_write(2, HardwareError::NotReady);
    let mut sink = RecordingSink::new();

    let status = default_loop().run(&mut store, &mut dac, &mut sink, &shutdown);

    assert!(status.is_success());
    assert_eq!(dac.writes(), vec![(0, 22), (2, 11), (0, 22)]);
    assert_eq!(status.stats().hardware_retries, 1);
    assert!(sink.events.contains(&Seen::WriteFailed {
        channel: 2,
        error: HardwareError::NotReady,
    }));
}

#[test]
fn fatal_hardware_error_fails_the_loop_immediately() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new()
        .with_value("yaw", "11")
        .with_value("pitch", "22");
    let mut dac = MockDac::new();
    dac.fail_next_write(2, HardwareError::BoardClosed);
    let mut sink = RecordingSink::new();
    let mut lp = default_loop();

    let status = lp.run(&mut store, &mut dac, &mut sink, &shutdown);

    assert_eq!(status.error(), Some(HardwareError::BoardClosed));
    assert_eq!(status.error().map(|e| e.code()), Some(-10));
    // yaw is bound first, so pitch is never fetched nor written.
    assert_eq!(store.gets, vec!["yaw"]);
    assert!(dac.writes().is_empty());
    assert_eq!(lp.state(), LoopState::Failed);
    assert_eq!(
        sink.events.last(),
        Some(&Seen::Aborted(HardwareError::BoardClosed))
    );
    assert_eq!(sink.count(|e| matches!(e, Seen::Stopped(_))), 0);
}

#[test]
fn finished_loop_does_not_restart() {
    let shutdown = Shutdown::new();
    let mut store = ScriptedStore::new().with_value("yaw", "1");
    let mut dac = MockDac::new();
    dac.fail_next_write(2, HardwareError::Driver);
    let mut lp = default_loop();

    let first = lp.run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);
    let gets = store.gets.len();
    let mut sink = RecordingSink::new();
    let second = lp.run(&mut store, &mut dac, &mut sink, &shutdown);

    assert!(matches!(first, ExitStatus::Failed { .. }));
    assert_eq!(first, second);
    assert_eq!(store.gets.len(), gets);
    assert!(sink.events.is_empty());
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn outputs_are_configured_in_binding_order() {
    let config = BridgeConfig {
        dac_span: DacSpan::Unipolar10,
        ..test_config(&[("yaw", 2), ("pitch", 0), ("roll", 5)])
    };
    let lp = SamplingLoop::new(&config);
    let mut dac = MockDac::new();

    lp.configure_outputs(&mut dac, config.dac_span).unwrap();

    assert_eq!(
        dac.calls,
        vec![
            DacCall::Range {
                channel: 2,
                span: DacSpan::Unipolar10
            },
            DacCall::Range {
                channel: 0,
                span: DacSpan::Unipolar10
            },
            DacCall::Range {
                channel: 5,
                span: DacSpan::Unipolar10
            },
        ]
    );
}

#[test]
fn range_write_failure_is_reported_to_the_caller() {
    let lp = default_loop();
    let mut dac = MockDac::new();
    dac.fail_ranges(HardwareError::LocalBus);

    assert_eq!(
        lp.configure_outputs(&mut dac, DacSpan::Bipolar5),
        Err(HardwareError::LocalBus)
    );
    assert!(dac.calls.is_empty());
}

// ── Cancellation ──────────────────────────────────────────────

#[test]
fn shutdown_from_another_thread_interrupts_the_wait() {
    let config = BridgeConfig {
        poll_interval_ms: 10_000,
        ..test_config(&[("yaw", 2)])
    };
    let mut lp = SamplingLoop::new(&config);
    let mut store = ScriptedStore::new().with_value("yaw", "3");
    let mut dac = MockDac::new();
    let shutdown = Shutdown::new();

    let trigger = shutdown.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.trigger();
    });

    let started = Instant::now();
    let status = lp.run(&mut store, &mut dac, &mut RecordingSink::new(), &shutdown);
    handle.join().unwrap();

    assert!(status.is_success());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(status.stats().iterations, 1);
    assert_eq!(dac.writes(), vec![(2, 3)]);
}
