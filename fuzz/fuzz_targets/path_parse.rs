#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Path parsing must never panic on arbitrary input.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = hdvault_derive::parse_path(text);
        let _ = hdvault_derive::parse_segment(text);
    }
});
