//! Credential wire formats.
//!
//! Three prefixed hex strings cross the storage boundary:
//!
//! - `|RP|` + hex(encrypt(JSON seed)) — the HD credential
//! - `|VS|` + hex(encrypt("OneKey")) — the wallet-unlock verify string
//! - `|PK|` + hex(encrypt(JSON imported key)) — an imported credential
//!
//! The storage layer persists these opaquely. Byte fields inside the
//! JSON bodies are hex strings.

use hdvault_cipher::aes256;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::DeriveError;

pub const HD_CREDENTIAL_PREFIX: &str = "|RP|";
pub const VERIFY_STRING_PREFIX: &str = "|VS|";
pub const IMPORTED_CREDENTIAL_PREFIX: &str = "|PK|";

/// Plaintext recovered by decrypting a verify string with the right
/// password.
pub const DEFAULT_VERIFY_STRING: &str = "OneKey";

/// Seed material produced once from a mnemonic and kept only in
/// encrypted form.
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(with = "hex_bytes")]
    pub entropy_with_lang_prefixed: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub seed: Vec<u8>,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct ImportedCredential {
    #[serde(with = "hex_bytes")]
    private_key: Vec<u8>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// Wrap a seed as an HD credential string.
pub fn encrypt_hd_credential(password: &str, seed: &Seed) -> Result<String, DeriveError> {
    let body = serde_json::to_vec(seed).map_err(|_| DeriveError::InvalidSeedOrCredentialFormat)?;
    let body = Zeroizing::new(body);
    let blob = aes256::encrypt(password, &body)?;
    Ok(format!("{HD_CREDENTIAL_PREFIX}{}", hex::encode(blob)))
}

/// Recover the seed from an HD credential string.
pub fn decrypt_hd_credential(password: &str, credential: &str) -> Result<Seed, DeriveError> {
    let blob = strip_and_decode(credential, HD_CREDENTIAL_PREFIX)?;
    let body = aes256::decrypt(password, &blob)?;
    let seed: Seed =
        serde_json::from_slice(&body).map_err(|_| DeriveError::InvalidSeedOrCredentialFormat)?;
    if seed.seed.is_empty() {
        return Err(DeriveError::InvalidSeedOrCredentialFormat);
    }
    Ok(seed)
}

/// Wrap a bare private key as an imported credential string.
pub fn encrypt_imported_credential(
    password: &str,
    private_key: &[u8],
) -> Result<String, DeriveError> {
    let credential = ImportedCredential {
        private_key: private_key.to_vec(),
    };
    let body = serde_json::to_vec(&credential)
        .map_err(|_| DeriveError::InvalidSeedOrCredentialFormat)?;
    let body = Zeroizing::new(body);
    let blob = aes256::encrypt(password, &body)?;
    Ok(format!("{IMPORTED_CREDENTIAL_PREFIX}{}", hex::encode(blob)))
}

/// Recover the private key from an imported credential string.
pub fn decrypt_imported_credential(
    password: &str,
    credential: &str,
) -> Result<Zeroizing<Vec<u8>>, DeriveError> {
    let blob = strip_and_decode(credential, IMPORTED_CREDENTIAL_PREFIX)?;
    let body = aes256::decrypt(password, &blob)?;
    let parsed: ImportedCredential =
        serde_json::from_slice(&body).map_err(|_| DeriveError::InvalidSeedOrCredentialFormat)?;
    Ok(Zeroizing::new(parsed.private_key.clone()))
}

/// Produce a fresh verify string for `password`.
pub fn encrypt_verify_string(password: &str) -> Result<String, DeriveError> {
    let blob = aes256::encrypt(password, DEFAULT_VERIFY_STRING.as_bytes())?;
    Ok(format!("{VERIFY_STRING_PREFIX}{}", hex::encode(blob)))
}

/// Legacy verify strings were stored without the `|VS|` prefix. They
/// are normalized by prepending it; the ciphertext is never touched.
/// A stored value that is exactly the bare default constant is a
/// legacy sentinel, not ciphertext, and passes through unchanged.
pub fn normalize_verify_string(verify_string: &str) -> String {
    if verify_string == DEFAULT_VERIFY_STRING
        || verify_string.starts_with(VERIFY_STRING_PREFIX)
    {
        verify_string.to_string()
    } else {
        format!("{VERIFY_STRING_PREFIX}{verify_string}")
    }
}

/// Check `password` against a stored verify string. A wrong password
/// or a verify string for some other password fails with
/// [`DeriveError::IncorrectPassword`].
pub fn verify_password(password: &str, verify_string: &str) -> Result<(), DeriveError> {
    let normalized = normalize_verify_string(verify_string);
    let blob = strip_and_decode(&normalized, VERIFY_STRING_PREFIX)?;
    let plain = aes256::decrypt(password, &blob)?;
    if plain.as_slice() != DEFAULT_VERIFY_STRING.as_bytes() {
        return Err(DeriveError::IncorrectPassword);
    }
    Ok(())
}

fn strip_and_decode(credential: &str, prefix: &str) -> Result<Vec<u8>, DeriveError> {
    let body = credential
        .strip_prefix(prefix)
        .ok_or(DeriveError::InvalidSeedOrCredentialFormat)?;
    hex::decode(body).map_err(|_| DeriveError::InvalidSeedOrCredentialFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_seed() -> Seed {
        Seed {
            entropy_with_lang_prefixed: vec![1u8; 17],
            seed: vec![2u8; 64],
        }
    }

    #[test]
    fn test_hd_credential_roundtrip() {
        let credential = encrypt_hd_credential("password123", &sample_seed()).unwrap();
        assert!(credential.starts_with("|RP|"));
        let seed = decrypt_hd_credential("password123", &credential).unwrap();
        assert_eq!(seed.seed, vec![2u8; 64]);
        assert_eq!(seed.entropy_with_lang_prefixed, vec![1u8; 17]);
    }

    #[test]
    fn test_hd_credential_wrong_password() {
        let credential = encrypt_hd_credential("password123", &sample_seed()).unwrap();
        assert_eq!(
            decrypt_hd_credential("wrong", &credential).unwrap_err(),
            DeriveError::IncorrectPassword
        );
    }

    #[test]
    fn test_hd_credential_bad_prefix() {
        let credential = encrypt_hd_credential("password123", &sample_seed()).unwrap();
        let renamed = credential.replace("|RP|", "|PK|");
        assert_eq!(
            decrypt_hd_credential("password123", &renamed).unwrap_err(),
            DeriveError::InvalidSeedOrCredentialFormat
        );
    }

    #[test]
    fn test_seed_json_uses_camel_case_hex() {
        let json = serde_json::to_value(sample_seed()).unwrap();
        assert_eq!(
            json["entropyWithLangPrefixed"].as_str().unwrap(),
            "11".repeat(17)
        );
        assert_eq!(json["seed"].as_str().unwrap(), "02".repeat(64));
    }

    #[test]
    fn test_imported_credential_roundtrip() {
        let key = [0x42u8; 32];
        let credential = encrypt_imported_credential("pw", &key).unwrap();
        assert!(credential.starts_with("|PK|"));
        let back = decrypt_imported_credential("pw", &credential).unwrap();
        assert_eq!(back.as_slice(), key);
    }

    #[test]
    fn test_verify_string_roundtrip() {
        let vs = encrypt_verify_string("password123").unwrap();
        assert!(vs.starts_with("|VS|"));
        assert!(verify_password("password123", &vs).is_ok());
        assert_eq!(
            verify_password("wrong", &vs).unwrap_err(),
            DeriveError::IncorrectPassword
        );
    }

    #[test]
    fn test_legacy_verify_string_is_normalized() {
        let vs = encrypt_verify_string("password123").unwrap();
        let legacy = vs.strip_prefix("|VS|").unwrap().to_string();
        assert_eq!(normalize_verify_string(&legacy), vs);
        assert!(verify_password("password123", &legacy).is_ok());
        // Already-prefixed strings pass through unchanged.
        assert_eq!(normalize_verify_string(&vs), vs);
    }

    #[test]
    fn test_bare_default_sentinel_is_not_prefixed() {
        // The bare constant is a legacy sentinel, not hex ciphertext;
        // prefixing it would misread it as an encrypted verify string.
        assert_eq!(
            normalize_verify_string(DEFAULT_VERIFY_STRING),
            DEFAULT_VERIFY_STRING
        );
    }
}
