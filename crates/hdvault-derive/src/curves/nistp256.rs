//! NIST P-256 arithmetic via `p256`.
//!
//! Signatures are the plain 64-byte compact form; this curve carries
//! no recovery id here.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::elliptic_curve::{Field, PrimeField};
use p256::{NonZeroScalar, ProjectivePoint, PublicKey, Scalar};
use zeroize::Zeroizing;

use crate::error::DeriveError;

pub(crate) fn public_from_private(private_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let key = SigningKey::from_slice(private_key).map_err(|_| DeriveError::InvalidPrivateKey)?;
    Ok(key
        .verifying_key()
        .to_encoded_point(true)
        .as_bytes()
        .to_vec())
}

pub(crate) fn sign(private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let key = SigningKey::from_slice(private_key).map_err(|_| DeriveError::InvalidPrivateKey)?;
    let signature: Signature = key
        .sign_prehash(digest)
        .map_err(|_| DeriveError::SigningFailed)?;
    Ok(signature.to_bytes().to_vec())
}

pub(crate) fn verify(public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    let compact = match signature.len() {
        64 => signature,
        65 => &signature[..64],
        _ => return false,
    };
    let Ok(key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(compact) else {
        return false;
    };
    key.verify_prehash(digest, &sig).is_ok()
}

pub(crate) fn transform_public_key(public_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
    let key = PublicKey::from_sec1_bytes(public_key).map_err(|_| DeriveError::InvalidPublicKey)?;
    let compress = public_key.len() == 65;
    Ok(key.to_encoded_point(compress).as_bytes().to_vec())
}

pub(crate) fn derive_child_public(
    tweak: &[u8; 32],
    parent_public: &[u8],
) -> Result<Option<Vec<u8>>, DeriveError> {
    let Some(tweak_scalar) = Option::<Scalar>::from(Scalar::from_repr((*tweak).into())) else {
        return Ok(None);
    };
    let parent =
        PublicKey::from_sec1_bytes(parent_public).map_err(|_| DeriveError::InvalidPublicKey)?;
    let child = ProjectivePoint::GENERATOR * tweak_scalar + parent.to_projective();
    match PublicKey::from_affine(child.to_affine()) {
        Ok(key) => Ok(Some(key.to_encoded_point(true).as_bytes().to_vec())),
        Err(_) => Ok(None),
    }
}

pub(crate) fn tweak_add_private(
    il: &[u8; 32],
    parent_key: &[u8; 32],
) -> Result<Option<Zeroizing<[u8; 32]>>, DeriveError> {
    let Some(il_scalar) = Option::<Scalar>::from(Scalar::from_repr((*il).into())) else {
        return Ok(None);
    };
    let parent_scalar = Option::<Scalar>::from(Scalar::from_repr((*parent_key).into()))
        .ok_or(DeriveError::InvalidPrivateKey)?;
    let child = il_scalar + parent_scalar;
    if bool::from(child.is_zero()) {
        return Ok(None);
    }
    Ok(Some(Zeroizing::new(child.to_bytes().into())))
}

pub(crate) fn is_valid_master_scalar(bytes: &[u8; 32]) -> bool {
    Option::<NonZeroScalar>::from(NonZeroScalar::from_repr((*bytes).into())).is_some()
}
