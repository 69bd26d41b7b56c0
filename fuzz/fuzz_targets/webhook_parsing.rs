#![no_main]

//! Fuzz target for webhook payload parsing.
//!
//! Ensures the event parser handles arbitrary bytes gracefully: malformed
//! bodies return an error, valid envelopes classify every event, and
//! nothing panics.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(events) = kotori_line::webhook::parse_events(data) {
        for event in &events {
            // Classification must never panic.
            let _ = event.kind_name();
        }
    }
});
