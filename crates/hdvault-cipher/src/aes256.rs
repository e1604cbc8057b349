//! AES-256-CBC encryption with PBKDF2 key stretching.
//!
//! Blob layout: `salt[32] ‖ iv[16] ‖ ciphertext`. The layout is part
//! of the stored-credential wire format, so there is no room for an
//! authentication tag; a wrong password (or a mismatched iteration
//! count) surfaces as a Pkcs7 unpad failure, reported as
//! [`CipherError::IncorrectPassword`].

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::trace;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::hash::sha256;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Default PBKDF2 round count. Stored blobs do not record the count,
/// so changing it breaks decryption of existing data.
pub const PBKDF2_NUM_OF_ITERATIONS: u32 = 5000;
/// Derived key length (AES-256).
pub const PBKDF2_KEY_LENGTH: usize = 32;
/// Salt length at the front of every blob.
pub const PBKDF2_SALT_LENGTH: usize = 32;
/// IV length following the salt.
pub const AES256_IV_LENGTH: usize = 16;
/// Offset at which ciphertext starts.
pub const ENCRYPTED_DATA_OFFSET: usize = PBKDF2_SALT_LENGTH + AES256_IV_LENGTH;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// Empty password, wrong password, or ciphertext that fails to
    /// unpad. Deliberately indistinguishable.
    #[error("incorrect password or corrupted ciphertext")]
    IncorrectPassword,
    /// Blob too short to contain `salt ‖ iv` plus one cipher block.
    #[error("invalid encrypted blob format")]
    InvalidFormat,
}

/// PBKDF2-HMAC-SHA256 over the SHA-256 of the password.
fn key_from_password_and_salt(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; PBKDF2_KEY_LENGTH]>, CipherError> {
    if password.is_empty() || salt.is_empty() {
        return Err(CipherError::IncorrectPassword);
    }
    trace!("stretching key: {} pbkdf2 rounds", iterations);
    let hashed_password = Zeroizing::new(sha256(password.as_bytes()));
    let mut key = Zeroizing::new([0u8; PBKDF2_KEY_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha256>(&*hashed_password, salt, iterations, &mut *key);
    Ok(key)
}

/// Encrypt `data` under `password` with a fresh random salt and IV.
///
/// Returns `salt ‖ iv ‖ ciphertext`.
pub fn encrypt(password: &str, data: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut salt = [0u8; PBKDF2_SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; AES256_IV_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    encrypt_with(password, data, &salt, &iv, PBKDF2_NUM_OF_ITERATIONS)
}

/// Deterministic variant of [`encrypt`] with caller-supplied salt, IV
/// and iteration count. The same count must be passed to
/// [`decrypt_with_iterations`] later.
pub fn encrypt_with(
    password: &str,
    data: &[u8],
    salt: &[u8; PBKDF2_SALT_LENGTH],
    iv: &[u8; AES256_IV_LENGTH],
    iterations: u32,
) -> Result<Vec<u8>, CipherError> {
    let key = key_from_password_and_salt(password, salt, iterations)?;

    let ciphertext =
        Aes256CbcEnc::new((&*key).into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data);

    let mut blob = Vec::with_capacity(ENCRYPTED_DATA_OFFSET + ciphertext.len());
    blob.extend_from_slice(salt);
    blob.extend_from_slice(iv);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a `salt ‖ iv ‖ ciphertext` blob encrypted with the default
/// iteration count.
pub fn decrypt(password: &str, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    decrypt_with_iterations(password, blob, PBKDF2_NUM_OF_ITERATIONS)
}

/// Decrypt a blob whose key was stretched with a custom round count.
pub fn decrypt_with_iterations(
    password: &str,
    blob: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    if password.is_empty() {
        return Err(CipherError::IncorrectPassword);
    }
    // Minimum: header plus one full cipher block.
    if blob.len() < ENCRYPTED_DATA_OFFSET + 16
        || (blob.len() - ENCRYPTED_DATA_OFFSET) % 16 != 0
    {
        return Err(CipherError::InvalidFormat);
    }

    let salt = &blob[..PBKDF2_SALT_LENGTH];
    let iv: &[u8; AES256_IV_LENGTH] = blob[PBKDF2_SALT_LENGTH..ENCRYPTED_DATA_OFFSET]
        .try_into()
        .map_err(|_| CipherError::InvalidFormat)?;
    let ciphertext = &blob[ENCRYPTED_DATA_OFFSET..];

    let key = key_from_password_and_salt(password, salt, iterations)?;

    let plaintext = Aes256CbcDec::new((&*key).into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::IncorrectPassword)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "password123";

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let data = b"the quick brown fox";
        let blob = encrypt(PASSWORD, data).unwrap();
        let plain = decrypt(PASSWORD, &blob).unwrap();
        assert_eq!(plain.as_slice(), data);
    }

    #[test]
    fn test_blob_layout() {
        let data = [0x42u8; 32];
        let blob = encrypt(PASSWORD, &data).unwrap();
        // 32-byte payload pads to 48 bytes of ciphertext
        assert_eq!(blob.len(), ENCRYPTED_DATA_OFFSET + 48);
    }

    #[test]
    fn test_wrong_password_fails() {
        let blob = encrypt(PASSWORD, b"secret").unwrap();
        let result = decrypt("not the password", &blob);
        assert_eq!(result.unwrap_err(), CipherError::IncorrectPassword);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            encrypt("", b"secret").unwrap_err(),
            CipherError::IncorrectPassword
        );
        let blob = encrypt(PASSWORD, b"secret").unwrap();
        assert_eq!(
            decrypt("", &blob).unwrap_err(),
            CipherError::IncorrectPassword
        );
    }

    #[test]
    fn test_custom_salt_iv_is_deterministic() {
        let salt = [0x11u8; PBKDF2_SALT_LENGTH];
        let iv = [0x22u8; AES256_IV_LENGTH];
        let a = encrypt_with(PASSWORD, b"data", &salt, &iv, PBKDF2_NUM_OF_ITERATIONS).unwrap();
        let b = encrypt_with(PASSWORD, b"data", &salt, &iv, PBKDF2_NUM_OF_ITERATIONS).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..PBKDF2_SALT_LENGTH], &salt);
        assert_eq!(&a[PBKDF2_SALT_LENGTH..ENCRYPTED_DATA_OFFSET], &iv);
    }

    #[test]
    fn test_random_salt_iv_differ_between_calls() {
        let a = encrypt(PASSWORD, b"data").unwrap();
        let b = encrypt(PASSWORD, b"data").unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(PASSWORD, &a).unwrap(), decrypt(PASSWORD, &b).unwrap());
    }

    #[test]
    fn test_mismatched_iterations_fail() {
        let salt = [0x11u8; PBKDF2_SALT_LENGTH];
        let iv = [0x22u8; AES256_IV_LENGTH];
        let blob = encrypt_with(PASSWORD, b"data", &salt, &iv, 100).unwrap();
        assert!(decrypt_with_iterations(PASSWORD, &blob, 100).is_ok());
        assert_eq!(
            decrypt_with_iterations(PASSWORD, &blob, 200).unwrap_err(),
            CipherError::IncorrectPassword
        );
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let blob = encrypt(PASSWORD, b"data").unwrap();
        assert_eq!(
            decrypt(PASSWORD, &blob[..ENCRYPTED_DATA_OFFSET]).unwrap_err(),
            CipherError::InvalidFormat
        );
        // Ciphertext must stay block-aligned
        assert_eq!(
            decrypt(PASSWORD, &blob[..blob.len() - 1]).unwrap_err(),
            CipherError::InvalidFormat
        );
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let blob = encrypt(PASSWORD, b"a fairly long plaintext so tampering is visible").unwrap();
        let mut tampered = blob.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0xff;
        assert!(decrypt(PASSWORD, &tampered).is_err());
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let blob = encrypt(PASSWORD, b"").unwrap();
        // Pkcs7 always emits at least one block
        assert_eq!(blob.len(), ENCRYPTED_DATA_OFFSET + 16);
        assert_eq!(decrypt(PASSWORD, &blob).unwrap().len(), 0);
    }
}
