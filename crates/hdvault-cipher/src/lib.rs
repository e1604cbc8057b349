//! HDVault Cipher
//!
//! Password-based encryption for key material at rest, plus the
//! sensitive-text layer that wraps passwords crossing process or task
//! boundaries.
//!
//! # Blob Format
//!
//! Every encrypted blob is self-describing:
//! `[salt (32 bytes)][iv (16 bytes)][AES-256-CBC ciphertext]`.
//! The encryption key is stretched from the password with PBKDF2, so
//! decryption needs only the blob, the password, and (when a caller
//! chose a non-default count) the iteration count used to encrypt.
//!
//! # Security Notes
//!
//! - The password is SHA-256 hashed before PBKDF2
//! - Each encryption uses a fresh random salt and IV
//! - Passwords and plaintext are never stored; decrypted output is
//!   zeroized on drop

pub mod aes256;
pub mod hash;
pub mod sensitive;

pub use aes256::{
    decrypt, decrypt_with_iterations, encrypt, encrypt_with, CipherError, AES256_IV_LENGTH,
    ENCRYPTED_DATA_OFFSET, PBKDF2_KEY_LENGTH, PBKDF2_NUM_OF_ITERATIONS, PBKDF2_SALT_LENGTH,
};
pub use hash::{hash160, hmac_sha512, sha256};
pub use sensitive::{is_encoded_text, SensitiveEncodeKey, SensitiveTextError, ENCODE_KEY_PREFIX};
