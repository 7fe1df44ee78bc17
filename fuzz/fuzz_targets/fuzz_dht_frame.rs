//! Fuzz target: DHT22 frame decoding
//!
//! Any 5-byte frame must decode to a finite temperature or a typed error.
//!
//! cargo fuzz run fuzz_dht_frame

#![no_main]

use firesense::sensors::temperature::{FRAME_LEN, decode_frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = <[u8; FRAME_LEN]>::try_from(data) else {
        return;
    };
    if let Ok(celsius) = decode_frame(&frame) {
        assert!(celsius.is_finite());
    }
});
