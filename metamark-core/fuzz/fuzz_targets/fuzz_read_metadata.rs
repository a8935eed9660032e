#![no_main]

//! Fuzz target for read_metadata_bytes()
//!
//! This target exercises the JPEG segment walker and TIFF decoder to find:
//! - Panics from malformed input
//! - Arithmetic overflow on crafted offsets and counts
//! - Logic errors in bounds handling
//!
//! Run with: cargo +nightly fuzz run fuzz_read_metadata

use libfuzzer_sys::fuzz_target;
use metamark_core::read_metadata_bytes;

fuzz_target!(|data: &[u8]| {
    // Reading is total: any input maps to a record, never a panic
    let _ = read_metadata_bytes(data);
});
