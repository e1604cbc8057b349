//! BIP32 path notation.
//!
//! A path is `m` followed by `/`-separated segments. A segment is a
//! decimal index, hardened when suffixed with `'` (`44'` means index
//! `44 + 2^31`).

use crate::error::DeriveError;

/// First hardened index, 2^31.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Whether `index` falls in the hardened range.
pub fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

/// Parse one segment into its index.
pub fn parse_segment(segment: &str) -> Result<u32, DeriveError> {
    let (digits, hardened) = match segment.strip_suffix('\'') {
        Some(rest) => (rest, true),
        None => (segment, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DeriveError::InvalidDerivationIndex(segment.to_string()));
    }
    let index: u32 = digits
        .parse()
        .map_err(|_| DeriveError::InvalidDerivationIndex(segment.to_string()))?;
    if hardened {
        if index >= HARDENED_OFFSET {
            return Err(DeriveError::InvalidDerivationIndex(segment.to_string()));
        }
        Ok(index + HARDENED_OFFSET)
    } else {
        Ok(index)
    }
}

/// Parse a full path into indices. A leading `m` (or `m/`) is
/// accepted and skipped; `"m"` alone parses to no indices.
pub fn parse_path(path: &str) -> Result<Vec<u32>, DeriveError> {
    let rest = match path.strip_prefix('m') {
        Some("") => return Ok(Vec::new()),
        Some(rest) => rest
            .strip_prefix('/')
            .ok_or_else(|| DeriveError::InvalidDerivationIndex(path.to_string()))?,
        None => path,
    };
    if rest.is_empty() {
        return Err(DeriveError::InvalidDerivationIndex(path.to_string()));
    }
    rest.split('/').map(parse_segment).collect()
}
