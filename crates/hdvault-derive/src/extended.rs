//! Extended key types.
//!
//! The plaintext and encrypted forms are distinct types so a
//! decrypted scalar cannot be handed to a function expecting
//! ciphertext, or the other way round, without an explicit
//! conversion. Plaintext keys zeroize themselves on drop.

use hdvault_cipher::aes256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::DeriveError;

/// An extended key in the clear. `key` is a 32-byte private scalar,
/// or a curve-native public key once neutered.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    pub key: Vec<u8>,
    pub chain_code: [u8; 32],
}

/// An extended key whose private part is an AES blob. This is the
/// only private form that may cross an API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedExtendedKey {
    pub key: Vec<u8>,
    pub chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Encrypt the key material for return to a caller. The chain
    /// code is public and stays in the clear.
    pub fn encrypt(&self, password: &str) -> Result<EncryptedExtendedKey, DeriveError> {
        Ok(EncryptedExtendedKey {
            key: aes256::encrypt(password, &self.key)?,
            chain_code: self.chain_code,
        })
    }
}

impl EncryptedExtendedKey {
    pub fn decrypt(&self, password: &str) -> Result<ExtendedKey, DeriveError> {
        let key = aes256::decrypt(password, &self.key)?;
        Ok(ExtendedKey {
            key: key.to_vec(),
            chain_code: self.chain_code,
        })
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes stay out of logs.
        f.debug_struct("ExtendedKey")
            .field("key_len", &self.key.len())
            .field("chain_code", &hex::encode(self.chain_code))
            .finish()
    }
}

/// Decrypt a bare encrypted private key, outside of any extended-key
/// context.
pub fn decrypt_private_key(
    encrypted_private_key: &[u8],
    password: &str,
) -> Result<Zeroizing<Vec<u8>>, DeriveError> {
    Ok(aes256::decrypt(password, encrypted_private_key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plain = ExtendedKey {
            key: vec![7u8; 32],
            chain_code: [9u8; 32],
        };
        let encrypted = plain.encrypt("password123").unwrap();
        assert_ne!(encrypted.key, plain.key);
        assert_eq!(encrypted.chain_code, plain.chain_code);
        let back = encrypted.decrypt("password123").unwrap();
        assert_eq!(back.key, plain.key);
        assert_eq!(back.chain_code, plain.chain_code);
    }

    #[test]
    fn test_wrong_password_is_detected() {
        let plain = ExtendedKey {
            key: vec![7u8; 32],
            chain_code: [9u8; 32],
        };
        let encrypted = plain.encrypt("password123").unwrap();
        assert_eq!(
            encrypted.decrypt("wrong").unwrap_err(),
            DeriveError::IncorrectPassword
        );
    }

    #[test]
    fn test_debug_hides_key_bytes() {
        let plain = ExtendedKey {
            key: vec![7u8; 32],
            chain_code: [9u8; 32],
        };
        let rendered = format!("{plain:?}");
        assert!(!rendered.contains("07, 07"));
        assert!(rendered.contains("key_len"));
    }
}
