//! Encrypted-at-rest derivation operations.
//!
//! Every function here takes and returns private key material in its
//! encrypted form; plaintext exists only inside the call, in
//! zeroized-on-drop buffers. These are the operations callers outside
//! this crate compose.

use zeroize::Zeroizing;

use crate::bip32::KeyDeriver;
use crate::curves::CurveName;
use crate::error::DeriveError;
use crate::extended::{decrypt_private_key, EncryptedExtendedKey, ExtendedKey};

/// Master extended key from an encrypted seed, returned re-encrypted
/// under the same password.
pub fn generate_master_key_from_seed(
    curve: CurveName,
    encrypted_seed: &[u8],
    password: &str,
) -> Result<EncryptedExtendedKey, DeriveError> {
    let seed = decrypt_private_key(encrypted_seed, password)?;
    let master = KeyDeriver::new(curve).master_from_seed(&seed)?;
    master.encrypt(password)
}

/// CKDPriv over encrypted parents.
pub fn derive_child_key(
    curve: CurveName,
    parent: &EncryptedExtendedKey,
    index: u32,
    password: &str,
) -> Result<EncryptedExtendedKey, DeriveError> {
    let plain_parent = parent.decrypt(password)?;
    let child = KeyDeriver::new(curve).derive_child_private(&plain_parent, index)?;
    child.encrypt(password)
}

/// CKDPub. Public parents carry no secrets, so there is no password
/// involved.
pub fn derive_child_public_key(
    curve: CurveName,
    parent: &ExtendedKey,
    index: u32,
) -> Result<ExtendedKey, DeriveError> {
    KeyDeriver::new(curve).derive_child_public(parent, index)
}

/// Neuter an encrypted private extended key. The result is public, so
/// it comes back in the clear.
pub fn neuter(
    curve: CurveName,
    encrypted: &EncryptedExtendedKey,
    password: &str,
) -> Result<ExtendedKey, DeriveError> {
    let plain = encrypted.decrypt(password)?;
    KeyDeriver::new(curve).neuter(&plain)
}

/// Public key from an encrypted private key.
pub fn public_from_private(
    curve: CurveName,
    encrypted_private_key: &[u8],
    password: &str,
) -> Result<Vec<u8>, DeriveError> {
    let private_key = decrypt_private_key(encrypted_private_key, password)?;
    curve.public_from_private(&private_key)
}

/// Sign a digest with an encrypted private key. The key is decrypted
/// fresh for this one call.
pub fn sign(
    curve: CurveName,
    encrypted_private_key: &[u8],
    digest: &[u8],
    password: &str,
) -> Result<Vec<u8>, DeriveError> {
    let private_key = decrypt_private_key(encrypted_private_key, password)?;
    curve.sign(&private_key, digest)
}

pub fn verify(curve: CurveName, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    curve.verify(public_key, digest, signature)
}

/// Compressed form of a public key, identity if already compressed.
pub fn compress_public_key(curve: CurveName, public_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    if public_key.len() == 65 {
        curve.transform_public_key(public_key)
    } else {
        Ok(public_key.to_vec())
    }
}

/// Uncompressed form of a public key, identity for curves with a
/// single encoding.
pub fn uncompress_public_key(curve: CurveName, public_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    if public_key.len() == 33 {
        curve.transform_public_key(public_key)
    } else {
        Ok(public_key.to_vec())
    }
}

/// Fingerprint of the master key of an HD credential, hex-encoded.
/// Used by account discovery to recognize a wallet without deriving
/// anything below the root.
pub fn generate_root_fingerprint_hex(
    curve: CurveName,
    hd_credential: &str,
    password: &str,
) -> Result<String, DeriveError> {
    let seed = crate::credential::decrypt_hd_credential(password, hd_credential)?;
    let deriver = KeyDeriver::new(curve);
    let master = deriver.master_from_seed(&seed.seed)?;
    Ok(hex::encode(deriver.fingerprint(&master)?))
}

/// Decrypt an encrypted private key for an export flow.
pub fn reveal_private_key(
    encrypted_private_key: &[u8],
    password: &str,
) -> Result<Zeroizing<Vec<u8>>, DeriveError> {
    decrypt_private_key(encrypted_private_key, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdvault_cipher::aes256;

    const PASSWORD: &str = "password123";

    fn encrypted_seed() -> Vec<u8> {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        aes256::encrypt(PASSWORD, &seed).unwrap()
    }

    #[test]
    fn test_master_key_stays_encrypted() {
        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        // 32-byte scalar encrypts to a 96-byte blob.
        assert_eq!(master.key.len(), 96);
        let plain = master.decrypt(PASSWORD).unwrap();
        assert_eq!(plain.key.len(), 32);
    }

    #[test]
    fn test_wrong_password_surfaces_everywhere() {
        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        assert_eq!(
            derive_child_key(CurveName::Secp256k1, &master, 0, "wrong").unwrap_err(),
            DeriveError::IncorrectPassword
        );
        assert_eq!(
            neuter(CurveName::Secp256k1, &master, "wrong").unwrap_err(),
            DeriveError::IncorrectPassword
        );
        assert_eq!(
            sign(CurveName::Secp256k1, &master.key, &[7u8; 32], "wrong").unwrap_err(),
            DeriveError::IncorrectPassword
        );
    }

    #[test]
    fn test_encrypted_derivation_matches_plain() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let deriver = KeyDeriver::new(CurveName::Secp256k1);
        let plain_child = deriver
            .derive_child_private(&deriver.master_from_seed(&seed).unwrap(), 7)
            .unwrap();

        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        let child = derive_child_key(CurveName::Secp256k1, &master, 7, PASSWORD).unwrap();
        assert_eq!(child.decrypt(PASSWORD).unwrap().key, plain_child.key);
        assert_eq!(child.chain_code, plain_child.chain_code);
    }

    #[test]
    fn test_sign_and_verify_through_encrypted_key() {
        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        let digest = hdvault_cipher::sha256(b"payload");
        let signature = sign(CurveName::Secp256k1, &master.key, &digest, PASSWORD).unwrap();
        let public = neuter(CurveName::Secp256k1, &master, PASSWORD).unwrap();
        assert!(verify(CurveName::Secp256k1, &public.key, &digest, &signature));
    }

    #[test]
    fn test_public_derivation_from_neutered_parent() {
        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        let via_private = neuter(
            CurveName::Secp256k1,
            &derive_child_key(CurveName::Secp256k1, &master, 3, PASSWORD).unwrap(),
            PASSWORD,
        )
        .unwrap();
        let parent_public = neuter(CurveName::Secp256k1, &master, PASSWORD).unwrap();
        let via_public =
            derive_child_public_key(CurveName::Secp256k1, &parent_public, 3).unwrap();
        assert_eq!(via_private.key, via_public.key);
        assert_eq!(via_private.chain_code, via_public.chain_code);
    }

    #[test]
    fn test_root_fingerprint() {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let credential = crate::credential::encrypt_hd_credential(
            PASSWORD,
            &crate::credential::Seed {
                entropy_with_lang_prefixed: seed.clone(),
                seed,
            },
        )
        .unwrap();
        assert_eq!(
            generate_root_fingerprint_hex(CurveName::Secp256k1, &credential, PASSWORD).unwrap(),
            "3442193e"
        );
    }

    #[test]
    fn test_compress_uncompress() {
        let master =
            generate_master_key_from_seed(CurveName::Secp256k1, &encrypted_seed(), PASSWORD)
                .unwrap();
        let public = neuter(CurveName::Secp256k1, &master, PASSWORD).unwrap();
        let uncompressed = uncompress_public_key(CurveName::Secp256k1, &public.key).unwrap();
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(
            compress_public_key(CurveName::Secp256k1, &uncompressed).unwrap(),
            public.key
        );
        assert_eq!(
            compress_public_key(CurveName::Secp256k1, &public.key).unwrap(),
            public.key
        );
    }
}
