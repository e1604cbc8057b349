//! Curve registry.
//!
//! A closed set of curves, looked up by name at the API boundary. An
//! unknown name is a hard error; nothing here falls back to a default
//! curve. Each operation dispatches to the per-curve module.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::error::DeriveError;

mod ed25519;
mod nistp256;
mod secp256k1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveName {
    Secp256k1,
    NistP256,
    Ed25519,
}

impl FromStr for CurveName {
    type Err = DeriveError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "secp256k1" => Ok(CurveName::Secp256k1),
            "nistp256" => Ok(CurveName::NistP256),
            "ed25519" => Ok(CurveName::Ed25519),
            other => Err(DeriveError::UnsupportedCurve(other.to_string())),
        }
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurveName::Secp256k1 => "secp256k1",
            CurveName::NistP256 => "nistp256",
            CurveName::Ed25519 => "ed25519",
        })
    }
}

impl CurveName {
    /// HMAC-SHA512 key used for master key generation from a seed.
    pub(crate) fn master_hmac_key(&self) -> &'static [u8] {
        match self {
            CurveName::Secp256k1 => b"Bitcoin seed",
            CurveName::NistP256 => b"Nist256p1 seed",
            CurveName::Ed25519 => b"ed25519 seed",
        }
    }

    /// Whether the curve derives per SLIP-0010 (hardened-only, no
    /// public-parent derivation, no master scalar check).
    pub(crate) fn is_slip10_only(&self) -> bool {
        matches!(self, CurveName::Ed25519)
    }

    pub fn public_from_private(&self, private_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
        match self {
            CurveName::Secp256k1 => secp256k1::public_from_private(private_key),
            CurveName::NistP256 => nistp256::public_from_private(private_key),
            CurveName::Ed25519 => ed25519::public_from_private(private_key),
        }
    }

    /// Sign a digest. secp256k1 yields 65 bytes, compact signature
    /// plus recovery id; the other curves yield the 64-byte signature
    /// alone.
    pub fn sign(&self, private_key: &[u8], digest: &[u8]) -> Result<Vec<u8>, DeriveError> {
        match self {
            CurveName::Secp256k1 => secp256k1::sign(private_key, digest),
            CurveName::NistP256 => nistp256::sign(private_key, digest),
            CurveName::Ed25519 => ed25519::sign(private_key, digest),
        }
    }

    pub fn verify(&self, public_key: &[u8], digest: &[u8], signature: &[u8]) -> bool {
        match self {
            CurveName::Secp256k1 => secp256k1::verify(public_key, digest, signature),
            CurveName::NistP256 => nistp256::verify(public_key, digest, signature),
            CurveName::Ed25519 => ed25519::verify(public_key, digest, signature),
        }
    }

    /// Toggle between compressed and uncompressed encodings where the
    /// curve has both; identity on ed25519.
    pub fn transform_public_key(&self, public_key: &[u8]) -> Result<Vec<u8>, DeriveError> {
        match self {
            CurveName::Secp256k1 => secp256k1::transform_public_key(public_key),
            CurveName::NistP256 => nistp256::transform_public_key(public_key),
            CurveName::Ed25519 => ed25519::transform_public_key(public_key),
        }
    }

    /// Child public key from a tweak, `None` meaning "retry with the
    /// next tweak" per the BIP32 loop.
    pub(crate) fn derive_child_public(
        &self,
        tweak: &[u8; 32],
        parent_public: &[u8],
    ) -> Result<Option<Vec<u8>>, DeriveError> {
        match self {
            CurveName::Secp256k1 => secp256k1::derive_child_public(tweak, parent_public),
            CurveName::NistP256 => nistp256::derive_child_public(tweak, parent_public),
            CurveName::Ed25519 => Err(DeriveError::UnsupportedOperation(
                "ed25519 does not support public parent key derivation",
            )),
        }
    }

    /// Child private scalar `(il + parent) mod n`, `None` meaning
    /// "retry with the next tweak".
    pub(crate) fn tweak_add_private(
        &self,
        il: &[u8; 32],
        parent_key: &[u8; 32],
    ) -> Result<Option<Zeroizing<[u8; 32]>>, DeriveError> {
        match self {
            CurveName::Secp256k1 => secp256k1::tweak_add_private(il, parent_key),
            CurveName::NistP256 => nistp256::tweak_add_private(il, parent_key),
            CurveName::Ed25519 => Err(DeriveError::UnsupportedOperation(
                "ed25519 child keys are not derived by scalar addition",
            )),
        }
    }

    /// Big-endian group order.
    pub fn group_order(&self) -> [u8; 32] {
        match self {
            CurveName::Secp256k1 => {
                use k256::elliptic_curve::bigint::ArrayEncoding;
                use k256::elliptic_curve::Curve;
                k256::Secp256k1::ORDER.to_be_byte_array().into()
            }
            CurveName::NistP256 => {
                use p256::elliptic_curve::bigint::ArrayEncoding;
                use p256::elliptic_curve::Curve;
                p256::NistP256::ORDER.to_be_byte_array().into()
            }
            // The ed25519 base-point order l, from RFC 8032.
            CurveName::Ed25519 => [
                0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x14, 0xde, 0xf9, 0xde, 0xa2, 0xf7, 0x9c, 0xd6, 0x58, 0x12,
                0x63, 0x1a, 0x5c, 0xf5, 0xd3, 0xed,
            ],
        }
    }

    pub(crate) fn is_valid_master_scalar(&self, bytes: &[u8; 32]) -> bool {
        match self {
            CurveName::Secp256k1 => secp256k1::is_valid_master_scalar(bytes),
            CurveName::NistP256 => nistp256::is_valid_master_scalar(bytes),
            // SLIP-0010 takes the HMAC output as-is.
            CurveName::Ed25519 => true,
        }
    }
}
