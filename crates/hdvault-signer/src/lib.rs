//! Chain-agnostic signing over encrypted private keys.
//!
//! A [`Verifier`] binds a public key to a curve; a [`Signer`] adds
//! the encrypted private key and the password needed to use it. Chain
//! adapters consume only this surface and own everything
//! chain-specific beyond it.
//!
//! Construction is the initialization: [`Signer::new`] decrypts and
//! neuters the private key once to fix the public-key fields, and the
//! returned value is immutable after that. The plaintext scalar is
//! never stored; [`Signer::sign`] decrypts it fresh for each call.

use hdvault_derive::{engine, CurveName, DeriveError};
use zeroize::Zeroizing;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error(transparent)]
    Derive(#[from] DeriveError),
}

/// A public key pinned to a curve, in both encodings.
#[derive(Debug, Clone)]
pub struct Verifier {
    curve: CurveName,
    compressed_public_key: Vec<u8>,
    uncompressed_public_key: Vec<u8>,
}

impl Verifier {
    /// From a hex-encoded curve-native public key.
    pub fn new(public_key_hex: &str, curve: CurveName) -> Result<Self, SignerError> {
        let public_key = hex::decode(public_key_hex).map_err(|_| SignerError::InvalidHex)?;
        Self::from_public_key(public_key, curve)
    }

    /// From raw public key bytes, compressed or uncompressed.
    pub fn from_public_key(public_key: Vec<u8>, curve: CurveName) -> Result<Self, SignerError> {
        let compressed = engine::compress_public_key(curve, &public_key)?;
        let uncompressed = engine::uncompress_public_key(curve, &compressed)?;
        Ok(Self {
            curve,
            compressed_public_key: compressed,
            uncompressed_public_key: uncompressed,
        })
    }

    pub fn curve(&self) -> CurveName {
        self.curve
    }

    pub fn get_pubkey(&self, compressed: bool) -> &[u8] {
        if compressed {
            &self.compressed_public_key
        } else {
            &self.uncompressed_public_key
        }
    }

    pub fn get_pubkey_hex(&self, compressed: bool) -> String {
        hex::encode(self.get_pubkey(compressed))
    }

    /// Verify `signature` over `digest` with this key. Trailing
    /// recovery ids on secp256k1 signatures are tolerated.
    pub fn verify_signature(&self, digest: &[u8], signature: &[u8]) -> bool {
        engine::verify(self.curve, &self.compressed_public_key, digest, signature)
    }

    /// Hex-input convenience for adapters that carry wire strings.
    pub fn verify_signature_hex(&self, digest_hex: &str, signature_hex: &str) -> Result<bool, SignerError> {
        let digest = hex::decode(digest_hex).map_err(|_| SignerError::InvalidHex)?;
        let signature = hex::decode(signature_hex).map_err(|_| SignerError::InvalidHex)?;
        Ok(self.verify_signature(&digest, &signature))
    }
}

/// A signing session over one encrypted private key.
#[derive(Debug)]
pub struct Signer {
    verifier: Verifier,
    encrypted_private_key: Vec<u8>,
    password: Zeroizing<String>,
}

impl Signer {
    pub fn new(
        encrypted_private_key: Vec<u8>,
        password: &str,
        curve: CurveName,
    ) -> Result<Self, SignerError> {
        let public_key = engine::public_from_private(curve, &encrypted_private_key, password)?;
        let verifier = Verifier::from_public_key(public_key, curve)?;
        Ok(Self {
            verifier,
            encrypted_private_key,
            password: Zeroizing::new(password.to_string()),
        })
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub fn curve(&self) -> CurveName {
        self.verifier.curve
    }

    pub fn get_pubkey(&self, compressed: bool) -> &[u8] {
        self.verifier.get_pubkey(compressed)
    }

    pub fn get_pubkey_hex(&self, compressed: bool) -> String {
        self.verifier.get_pubkey_hex(compressed)
    }

    pub fn verify_signature(&self, digest: &[u8], signature: &[u8]) -> bool {
        self.verifier.verify_signature(digest, signature)
    }

    /// Sign a digest. Returns the signature and the recovery id: for
    /// secp256k1 the last byte of the 65-byte curve output, zero for
    /// every other curve.
    pub fn sign(&self, digest: &[u8]) -> Result<(Vec<u8>, u8), SignerError> {
        let raw = engine::sign(
            self.curve(),
            &self.encrypted_private_key,
            digest,
            &self.password,
        )?;
        match self.curve() {
            CurveName::Secp256k1 => {
                let (signature, recovery) = raw.split_at(64);
                Ok((signature.to_vec(), recovery[0]))
            }
            _ => Ok((raw, 0)),
        }
    }

    /// Decrypt the private key for an export flow.
    pub fn get_prvkey(&self) -> Result<Zeroizing<Vec<u8>>, SignerError> {
        Ok(engine::reveal_private_key(
            &self.encrypted_private_key,
            &self.password,
        )?)
    }

    pub fn get_prvkey_hex(&self) -> Result<Zeroizing<String>, SignerError> {
        Ok(Zeroizing::new(hex::encode(self.get_prvkey()?.as_slice())))
    }
}
