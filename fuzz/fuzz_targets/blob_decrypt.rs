#![no_main]

use hdvault_cipher::aes256;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decrypting arbitrary bytes must never panic — any malformed
    // blob or mismatched ciphertext comes back as Err.
    // One PBKDF2 iteration keeps the fuzzer fast.
    let _ = aes256::decrypt_with_iterations("password123", data, 1);
});
