//! Fuzz target: `parse_range`
//!
//! Arbitrary text must either parse to a finite rate or be rejected.
//!
//! cargo fuzz run fuzz_range_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use soilprobe::dosage::parse_range;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(value) = parse_range(text) {
        assert!(value.is_finite());
    }
});
