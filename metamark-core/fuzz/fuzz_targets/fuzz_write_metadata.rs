#![no_main]

//! Fuzz target for the decode-then-rewrite path
//!
//! Feeds arbitrary bytes through read_metadata_bytes() and writes whatever
//! record came out into a minimal JPEG shell, exercising the encoder against
//! decoder-produced records.
//!
//! Run with: cargo +nightly fuzz run fuzz_write_metadata

use libfuzzer_sys::fuzz_target;
use metamark_core::{read_metadata_bytes, write_metadata_bytes};

fuzz_target!(|data: &[u8]| {
    let record = read_metadata_bytes(data);
    // Rewriting must never panic; oversized records come back as errors
    let shell = [0xFF, 0xD8, 0xFF, 0xD9];
    let _ = write_metadata_bytes(&shell, &record);
});
