//! Fuzz target: store reply → DAC setpoint
//!
//! Feeds arbitrary bytes through the same path a Redis reply takes
//! (lossy UTF-8, then `ChannelBinding::sample`) and verifies:
//! - No panics under arbitrary input
//! - An accepted sample always lies inside the binding's range
//! - An accepted sample equals what `parse_unsigned` reads
//!
//! cargo fuzz run fuzz_sample_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use nrc_bridge::app::binding::{ChannelBinding, parse_unsigned};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let a = u16::from_le_bytes([data[0], data[1]]);
    let b = u16::from_le_bytes([data[2], data[3]]);
    let binding = ChannelBinding::new("fuzz", 0).with_range(a.min(b), a.max(b));

    let text = String::from_utf8_lossy(&data[4..]);
    match binding.sample(Some(&text)) {
        Ok(value) => {
            assert!(value >= binding.min && value <= binding.max);
            assert_eq!(parse_unsigned(&text), Some(u32::from(value)));
        }
        Err(_) => {
            if let Some(v) = parse_unsigned(&text) {
                assert!(v < u32::from(binding.min) || v > u32::from(binding.max));
            }
        }
    }
});
