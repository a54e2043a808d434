//! Fuzz target: JSON configuration
//!
//! Deserializes arbitrary bytes as a `BridgeConfig` and verifies that any
//! config passing `validate` can actually drive a sampling loop:
//! - No panics in serde or validation
//! - Every bound channel is a real DAC channel, used at most once
//!
//! cargo fuzz run fuzz_config_load

#![no_main]

use libfuzzer_sys::fuzz_target;
use nrc_bridge::app::service::SamplingLoop;
use nrc_bridge::config::BridgeConfig;
use nrc_bridge::drivers::dac::DAC_CHANNELS;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = serde_json::from_slice::<BridgeConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    let lp = SamplingLoop::new(&cfg);
    let mut seen = 0u8;
    for b in lp.bindings() {
        assert!(b.channel < DAC_CHANNELS);
        assert_eq!(seen & (1 << b.channel), 0, "channel {} bound twice", b.channel);
        seen |= 1 << b.channel;
        assert!(b.min <= b.max);
    }
});
