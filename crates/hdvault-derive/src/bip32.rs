//! BIP32 and SLIP-0010 child key derivation.
//!
//! secp256k1 and nistp256 follow BIP32, including the retry loop that
//! replaces the HMAC input with `0x01 ‖ IR ‖ ser32(index)` when a
//! candidate scalar falls outside the group. ed25519 follows
//! SLIP-0010: hardened indices only, a single HMAC pass, and no
//! derivation from a public parent.

use hdvault_cipher::{hash160, hmac_sha512, sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::curves::CurveName;
use crate::error::DeriveError;
use crate::extended::ExtendedKey;
use crate::path::{is_hardened, parse_path};

/// Message signed during the neuter self-check.
const NEUTER_CHECK_MESSAGE: &[u8] = b"Hello OneKey";

#[derive(Debug, Clone, Copy)]
pub struct KeyDeriver {
    curve: CurveName,
}

impl KeyDeriver {
    pub fn new(curve: CurveName) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> CurveName {
        self.curve
    }

    /// Master extended key from a seed.
    ///
    /// For the BIP32 curves the left half of the HMAC output must be
    /// a valid nonzero scalar; an out-of-range value fails with
    /// [`DeriveError::InvalidMasterKey`] and is never retried, so one
    /// seed maps to exactly one master key. SLIP-0010 ed25519 takes
    /// the output as-is.
    pub fn master_from_seed(&self, seed: &[u8]) -> Result<ExtendedKey, DeriveError> {
        let i = Zeroizing::new(hmac_sha512(self.curve.master_hmac_key(), seed));
        let mut il = [0u8; 32];
        il.copy_from_slice(&i[..32]);
        if !self.curve.is_valid_master_scalar(&il) {
            il.zeroize();
            return Err(DeriveError::InvalidMasterKey);
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        let key = il.to_vec();
        il.zeroize();
        Ok(ExtendedKey { key, chain_code })
    }

    /// Neuter: public extended key from a private one.
    ///
    /// The fresh public key is checked by signing a fixed message and
    /// verifying the signature with it; a failure means corrupted
    /// arithmetic and is fatal.
    pub fn neuter(&self, parent: &ExtendedKey) -> Result<ExtendedKey, DeriveError> {
        let public = self.curve.public_from_private(&parent.key)?;
        let digest = sha256(NEUTER_CHECK_MESSAGE);
        let signature = self.curve.sign(&parent.key, &digest)?;
        if !self.curve.verify(&public, &digest, &signature) {
            return Err(DeriveError::KeyGenerationFailed);
        }
        Ok(ExtendedKey {
            key: public,
            chain_code: parent.chain_code,
        })
    }

    /// CKDPriv.
    pub fn derive_child_private(
        &self,
        parent: &ExtendedKey,
        index: u32,
    ) -> Result<ExtendedKey, DeriveError> {
        let parent_key: &[u8; 32] = parent
            .key
            .as_slice()
            .try_into()
            .map_err(|_| DeriveError::InvalidPrivateKey)?;

        if self.curve.is_slip10_only() {
            if !is_hardened(index) {
                return Err(DeriveError::UnsupportedOperation(
                    "ed25519 only supports hardened derivation",
                ));
            }
            let data = hardened_data(parent_key, index);
            let i = Zeroizing::new(hmac_sha512(&parent.chain_code, &data));
            let mut chain_code = [0u8; 32];
            chain_code.copy_from_slice(&i[32..]);
            return Ok(ExtendedKey {
                key: i[..32].to_vec(),
                chain_code,
            });
        }

        let mut data = if is_hardened(index) {
            hardened_data(parent_key, index)
        } else {
            let mut buf = Zeroizing::new(Vec::with_capacity(37));
            buf.extend_from_slice(&self.curve.public_from_private(&parent.key)?);
            buf.extend_from_slice(&index.to_be_bytes());
            buf
        };

        loop {
            let i = Zeroizing::new(hmac_sha512(&parent.chain_code, &data));
            let mut il = [0u8; 32];
            il.copy_from_slice(&i[..32]);
            let result = self.curve.tweak_add_private(&il, parent_key);
            il.zeroize();
            match result? {
                Some(child) => {
                    let mut chain_code = [0u8; 32];
                    chain_code.copy_from_slice(&i[32..]);
                    return Ok(ExtendedKey {
                        key: child.to_vec(),
                        chain_code,
                    });
                }
                None => data = retry_data(&i[32..], index),
            }
        }
    }

    /// CKDPub. Hardened indices and ed25519 are rejected.
    pub fn derive_child_public(
        &self,
        parent: &ExtendedKey,
        index: u32,
    ) -> Result<ExtendedKey, DeriveError> {
        if self.curve.is_slip10_only() {
            return Err(DeriveError::UnsupportedOperation(
                "ed25519 does not support public parent key derivation",
            ));
        }
        if is_hardened(index) {
            return Err(DeriveError::UnsupportedOperation(
                "hardened derivation requires the private parent key",
            ));
        }

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        data.extend_from_slice(&parent.key);
        data.extend_from_slice(&index.to_be_bytes());

        loop {
            let i = hmac_sha512(&parent.chain_code, &data);
            let mut il = [0u8; 32];
            il.copy_from_slice(&i[..32]);
            match self.curve.derive_child_public(&il, &parent.key)? {
                Some(child) => {
                    let mut chain_code = [0u8; 32];
                    chain_code.copy_from_slice(&i[32..]);
                    return Ok(ExtendedKey {
                        key: child,
                        chain_code,
                    });
                }
                None => data = retry_data(&i[32..], index),
            }
        }
    }

    /// Walk a whole path of private derivations from `node`.
    pub fn derive_path(&self, node: &ExtendedKey, path: &str) -> Result<ExtendedKey, DeriveError> {
        let mut current = node.clone();
        for index in parse_path(path)? {
            current = self.derive_child_private(&current, index)?;
        }
        Ok(current)
    }

    /// Fingerprint of a private node: first four bytes of
    /// `hash160(public key)`.
    pub fn fingerprint(&self, node: &ExtendedKey) -> Result<[u8; 4], DeriveError> {
        let public = self.neuter(node)?;
        let digest = hash160(&public.key);
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&digest[..4]);
        Ok(fingerprint)
    }
}

/// `0x00 ‖ key ‖ ser32(index)`, the hardened HMAC input.
fn hardened_data(parent_key: &[u8; 32], index: u32) -> Zeroizing<Vec<u8>> {
    let mut data = Zeroizing::new(Vec::with_capacity(37));
    data.push(0u8);
    data.extend_from_slice(parent_key);
    data.extend_from_slice(&index.to_be_bytes());
    data
}

/// `0x01 ‖ IR ‖ ser32(index)`, the retry-branch HMAC input.
fn retry_data(ir: &[u8], index: u32) -> Zeroizing<Vec<u8>> {
    let mut data = Zeroizing::new(Vec::with_capacity(37));
    data.push(1u8);
    data.extend_from_slice(ir);
    data.extend_from_slice(&index.to_be_bytes());
    data
}
