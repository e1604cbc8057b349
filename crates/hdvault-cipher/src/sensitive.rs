//! Sensitive-text wrapping.
//!
//! Raw passwords should not travel across task or process boundaries.
//! This module wraps them as opaque encoded tokens: the text is
//! AES-encrypted under a process-local [`SensitiveEncodeKey`] and
//! carried as a prefixed hex string. This is an obfuscation boundary,
//! not a cryptographic one — the key lives in the same process — but
//! it keeps plaintext passwords out of logs, queues and IPC payloads.
//!
//! The key is an explicit capability value: whoever owns it decides
//! which components may encode or decode. There is no process-global
//! state here.

use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::aes256::{self, CipherError};

/// Prefix identifying a string as an encode key rather than a password.
pub const ENCODE_KEY_PREFIX: &str = "ENCODE_KEY::";

/// Prefix identifying AES-encoded sensitive text.
const ENCODED_TEXT_PREFIX_AES: &str = "SENSITIVE_ENCODE::AES::";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SensitiveTextError {
    #[error("not an encode key: missing the ENCODE_KEY:: prefix")]
    InvalidEncodeKey,
    #[error("text is not encoded sensitive text")]
    NotEncoded,
    #[error("raw passwords may not cross this boundary; encode them first")]
    RawPasswordForbidden,
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

/// Whether `text` carries the sensitive-text encoding prefix.
pub fn is_encoded_text(text: &str) -> bool {
    text.starts_with(ENCODED_TEXT_PREFIX_AES)
}

/// Process-local capability for encoding and decoding sensitive text.
///
/// Generated once at startup by the process owner and handed to the
/// components that need it. Dropping the key zeroizes it.
pub struct SensitiveEncodeKey {
    key: Zeroizing<String>,
}

impl SensitiveEncodeKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut entropy = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut entropy);
        Self {
            key: Zeroizing::new(format!("{ENCODE_KEY_PREFIX}{}", hex::encode(entropy))),
        }
    }

    /// Adopt a key received from the owning component, e.g. across an
    /// IPC bridge. The prefix is required so a password can never be
    /// mistaken for a key.
    pub fn from_key(key: &str) -> Result<Self, SensitiveTextError> {
        if !key.starts_with(ENCODE_KEY_PREFIX) {
            return Err(SensitiveTextError::InvalidEncodeKey);
        }
        Ok(Self {
            key: Zeroizing::new(key.to_string()),
        })
    }

    /// The key string, for handing to another component.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Encode `text` as an opaque token. Already-encoded input is
    /// returned unchanged.
    pub fn encode_text(&self, text: &str) -> Result<String, SensitiveTextError> {
        if is_encoded_text(text) {
            return Ok(text.to_string());
        }
        let blob = aes256::encrypt(&self.key, text.as_bytes())?;
        Ok(format!("{ENCODED_TEXT_PREFIX_AES}{}", hex::encode(blob)))
    }

    /// Decode a token produced by [`encode_text`](Self::encode_text).
    /// Unencoded input passes through untouched.
    pub fn decode_text(&self, encoded: &str) -> Result<Zeroizing<String>, SensitiveTextError> {
        let Some(body) = encoded.strip_prefix(ENCODED_TEXT_PREFIX_AES) else {
            return Ok(Zeroizing::new(encoded.to_string()));
        };
        let blob = hex::decode(body).map_err(|_| SensitiveTextError::NotEncoded)?;
        let plain = aes256::decrypt(&self.key, &blob)?;
        let text =
            String::from_utf8(plain.to_vec()).map_err(|_| SensitiveTextError::NotEncoded)?;
        Ok(Zeroizing::new(text))
    }

    /// Recover a usable password from whatever a caller handed us.
    ///
    /// Encode-key tokens pass through (they are keys, not passwords);
    /// encoded passwords are decoded; raw passwords are rejected
    /// unless the caller explicitly opted in with `allow_raw`.
    pub fn decode_password(
        &self,
        password: &str,
        allow_raw: bool,
    ) -> Result<Zeroizing<String>, SensitiveTextError> {
        if password.starts_with(ENCODE_KEY_PREFIX) {
            return Ok(Zeroizing::new(password.to_string()));
        }
        if is_encoded_text(password) {
            return self.decode_text(password);
        }
        if !allow_raw {
            return Err(SensitiveTextError::RawPasswordForbidden);
        }
        Ok(Zeroizing::new(password.to_string()))
    }

    /// Wrap a raw password for transport.
    pub fn encode_password(&self, password: &str) -> Result<String, SensitiveTextError> {
        self.encode_text(password)
    }
}

/// Fail unless `text` is already encoded. Callers at async or IPC
/// boundaries use this as a precondition.
pub fn ensure_encoded(text: &str) -> Result<(), SensitiveTextError> {
    if !is_encoded_text(text) {
        return Err(SensitiveTextError::NotEncoded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let key = SensitiveEncodeKey::generate();
        let encoded = key.encode_text("hunter2").unwrap();
        assert!(is_encoded_text(&encoded));
        assert_eq!(key.decode_text(&encoded).unwrap().as_str(), "hunter2");
    }

    #[test]
    fn test_encode_is_idempotent() {
        let key = SensitiveEncodeKey::generate();
        let encoded = key.encode_text("secret").unwrap();
        let twice = key.encode_text(&encoded).unwrap();
        assert_eq!(encoded, twice);
    }

    #[test]
    fn test_decode_with_wrong_key_fails() {
        let key = SensitiveEncodeKey::generate();
        let other = SensitiveEncodeKey::generate();
        let encoded = key.encode_text("secret").unwrap();
        assert!(other.decode_text(&encoded).is_err());
    }

    #[test]
    fn test_decode_password_rejects_raw() {
        let key = SensitiveEncodeKey::generate();
        assert_eq!(
            key.decode_password("raw password", false).unwrap_err(),
            SensitiveTextError::RawPasswordForbidden
        );
        assert_eq!(
            key.decode_password("raw password", true).unwrap().as_str(),
            "raw password"
        );
    }

    #[test]
    fn test_decode_password_unwraps_encoded() {
        let key = SensitiveEncodeKey::generate();
        let encoded = key.encode_password("password123").unwrap();
        assert_eq!(
            key.decode_password(&encoded, false).unwrap().as_str(),
            "password123"
        );
    }

    #[test]
    fn test_encode_key_token_passes_through() {
        let key = SensitiveEncodeKey::generate();
        let other = SensitiveEncodeKey::generate();
        let token = other.as_str();
        assert_eq!(key.decode_password(token, false).unwrap().as_str(), token);
    }

    #[test]
    fn test_from_key_requires_prefix() {
        assert!(SensitiveEncodeKey::from_key("password123").is_err());
        let key = SensitiveEncodeKey::generate();
        let adopted = SensitiveEncodeKey::from_key(key.as_str()).unwrap();
        let encoded = key.encode_text("shared").unwrap();
        assert_eq!(adopted.decode_text(&encoded).unwrap().as_str(), "shared");
    }

    #[test]
    fn test_ensure_encoded() {
        let key = SensitiveEncodeKey::generate();
        let encoded = key.encode_text("x").unwrap();
        assert!(ensure_encoded(&encoded).is_ok());
        assert_eq!(ensure_encoded("x").unwrap_err(), SensitiveTextError::NotEncoded);
    }

    #[test]
    fn test_unicode_text_roundtrip() {
        let key = SensitiveEncodeKey::generate();
        let encoded = key.encode_text("密码🔑 pass").unwrap();
        assert_eq!(key.decode_text(&encoded).unwrap().as_str(), "密码🔑 pass");
    }
}
