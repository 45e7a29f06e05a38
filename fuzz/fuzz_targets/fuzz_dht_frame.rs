//! Fuzz target: `dht11::decode_frame`
//!
//! Arbitrary five-byte frames must either fail the checksum or decode to
//! finite values inside what the DHT11 byte layout can express.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartkitchen::sensors::dht11::decode_frame;

fuzz_target!(|data: [u8; 5]| {
    if let Ok(r) = decode_frame(data) {
        assert!(r.humidity_pct.is_finite() && r.temperature_c.is_finite());
        assert!((0.0..=281.0).contains(&r.humidity_pct));
        assert!((-257.0..=257.0).contains(&r.temperature_c));
    }
});
