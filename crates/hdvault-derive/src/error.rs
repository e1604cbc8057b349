use hdvault_cipher::CipherError;
use thiserror::Error;

/// Errors surfaced by key derivation, credential handling and curve
/// arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    /// Wrong password, or ciphertext corrupted beyond recovery.
    #[error("incorrect password")]
    IncorrectPassword,

    /// Curve name not present in the registry.
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Path segment that is not a valid u32 index.
    #[error("invalid derivation index: {0}")]
    InvalidDerivationIndex(String),

    /// Master key scalar outside (0, n). Fatal for the seed, never
    /// retried: one seed must map to exactly one master key.
    #[error("master key scalar out of range for this curve")]
    InvalidMasterKey,

    /// Operation the curve does not define, e.g. ed25519 non-hardened
    /// derivation or any public-parent hardened derivation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Credential or seed blob that decrypted but does not parse.
    #[error("malformed seed or credential")]
    InvalidSeedOrCredentialFormat,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signing failed")]
    SigningFailed,

    /// The freshly neutered public key failed its sign/verify
    /// self-check.
    #[error("derived public key failed its signature self-check")]
    KeyGenerationFailed,
}

impl From<CipherError> for DeriveError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::IncorrectPassword => DeriveError::IncorrectPassword,
            CipherError::InvalidFormat => DeriveError::InvalidSeedOrCredentialFormat,
        }
    }
}
