#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Credential strings arrive from storage and cannot be trusted.
    // Parsing and decrypting must always return Ok or Err, never panic.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = hdvault_derive::decrypt_hd_credential("password123", text);
        let _ = hdvault_derive::decrypt_imported_credential("password123", text);
        let _ = hdvault_derive::verify_password("password123", text);
    }
});
