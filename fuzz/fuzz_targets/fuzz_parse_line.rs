//! Fuzz target: `parse_line`
//!
//! Feeds arbitrary bytes as one serial line and checks the parser never
//! panics and never yields more readings than there are commas.
//!
//! cargo fuzz run fuzz_parse_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermoguard::sensors::line_stream::parse_line;

fuzz_target!(|data: &[u8]| {
    let raw = parse_line(data);
    let commas = data.iter().filter(|&&b| b == b',').count();
    assert!(raw.len() <= commas);
    assert!(raw.cells().iter().all(|c| c.is_nan() || c.is_finite()));
});
