//! Ed25519 via `ed25519-dalek`.
//!
//! Scalars are clamped inside the signing key, so there is no range
//! check to do here, and a public key has exactly one 32-byte
//! encoding.

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};

use crate::error::DeriveError;

pub(crate) fn public_from_private(private_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let bytes: &[u8; 32] = private_key
        .try_into()
        .map_err(|_| DeriveError::InvalidPrivateKey)?;
    let key = SigningKey::from_bytes(bytes);
    Ok(key.verifying_key().to_bytes().to_vec())
}

pub(crate) fn sign(private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let bytes: &[u8; 32] = private_key
        .try_into()
        .map_err(|_| DeriveError::InvalidPrivateKey)?;
    let key = SigningKey::from_bytes(bytes);
    Ok(key.sign(digest).to_bytes().to_vec())
}

pub(crate) fn verify(public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    let Ok(bytes) = <&[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(bytes) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(digest, &sig).is_ok()
}

/// Ed25519 public keys have a single encoding; the transform is the
/// identity.
pub(crate) fn transform_public_key(public_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    if public_key.len() != 32 {
        return Err(DeriveError::InvalidPublicKey);
    }
    Ok(public_key.to_vec())
}
