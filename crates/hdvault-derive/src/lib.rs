//! Multi-curve hierarchical-deterministic key derivation over
//! encrypted seeds.
//!
//! BIP32 derivation for secp256k1 and nistp256, SLIP-0010 for
//! ed25519, on top of the password-based encryption in
//! `hdvault-cipher`. Private key material crosses every public API
//! boundary in encrypted form; plaintext lives only inside a
//! derivation call, in buffers zeroized on drop.
//!
//! - [`curves`]: the closed curve registry and per-curve arithmetic
//! - [`bip32`]: master key generation, CKDPriv/CKDPub, neuter
//! - [`engine`]: the same operations over encrypted inputs/outputs
//! - [`batch`]: many paths from one credential, ancestors derived once
//! - [`credential`]: the `|RP|` / `|VS|` / `|PK|` wire strings

pub mod batch;
pub mod bip32;
pub mod credential;
pub mod curves;
pub mod engine;
pub mod error;
pub mod extended;
pub mod path;

pub use batch::{
    batch_get_private_keys, batch_get_public_keys, DerivedPrivateKey, DerivedPublicKey,
};
pub use bip32::KeyDeriver;
pub use credential::{
    decrypt_hd_credential, decrypt_imported_credential, encrypt_hd_credential,
    encrypt_imported_credential, encrypt_verify_string, normalize_verify_string, verify_password,
    Seed, DEFAULT_VERIFY_STRING, HD_CREDENTIAL_PREFIX, IMPORTED_CREDENTIAL_PREFIX,
    VERIFY_STRING_PREFIX,
};
pub use curves::CurveName;
pub use error::DeriveError;
pub use extended::{EncryptedExtendedKey, ExtendedKey};
pub use path::{is_hardened, parse_path, parse_segment, HARDENED_OFFSET};
