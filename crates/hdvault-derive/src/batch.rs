//! Batch derivation over an HD credential.
//!
//! One call decrypts the credential once, derives every requested
//! path, and caches shared ancestors so each node is derived at most
//! once. The cache lives for the duration of the call only.
//! Fingerprints are computed lazily, the first time a node is needed
//! as some child's parent.

use std::collections::HashMap;

use log::debug;

use crate::bip32::KeyDeriver;
use crate::credential::decrypt_hd_credential;
use crate::curves::CurveName;
use crate::error::DeriveError;
use crate::extended::{EncryptedExtendedKey, ExtendedKey};
use crate::path::parse_segment;

/// One derived private key, re-encrypted before leaving the batch.
#[derive(Debug, Clone)]
pub struct DerivedPrivateKey {
    pub path: String,
    /// Four bytes for any node below the prefix; empty for the prefix
    /// node itself.
    pub parent_fingerprint: Vec<u8>,
    pub extended_key: EncryptedExtendedKey,
}

/// One derived public key.
#[derive(Debug, Clone)]
pub struct DerivedPublicKey {
    pub path: String,
    pub parent_fingerprint: Vec<u8>,
    pub extended_key: ExtendedKey,
}

struct CacheEntry {
    fingerprint: Option<[u8; 4]>,
    parent_fingerprint: Vec<u8>,
    node: ExtendedKey,
}

/// Derive private keys for `rel_paths` under `prefix`, each key
/// encrypted under `password` on the way out.
pub fn batch_get_private_keys(
    curve: CurveName,
    hd_credential: &str,
    password: &str,
    prefix: &str,
    rel_paths: &[&str],
) -> Result<Vec<DerivedPrivateKey>, DeriveError> {
    let deriver = KeyDeriver::new(curve);
    let mut cache = build_cache(&deriver, hd_credential, password, prefix)?;
    let mut out = Vec::with_capacity(rel_paths.len());
    for rel_path in rel_paths {
        let path = derive_into_cache(&deriver, &mut cache, prefix, rel_path)?;
        let entry = lookup(&cache, &path)?;
        out.push(DerivedPrivateKey {
            path: path.clone(),
            parent_fingerprint: entry.parent_fingerprint.clone(),
            extended_key: entry.node.encrypt(password)?,
        });
    }
    Ok(out)
}

/// Derive public keys for `rel_paths` under `prefix`.
pub fn batch_get_public_keys(
    curve: CurveName,
    hd_credential: &str,
    password: &str,
    prefix: &str,
    rel_paths: &[&str],
) -> Result<Vec<DerivedPublicKey>, DeriveError> {
    let deriver = KeyDeriver::new(curve);
    let mut cache = build_cache(&deriver, hd_credential, password, prefix)?;
    let mut out = Vec::with_capacity(rel_paths.len());
    for rel_path in rel_paths {
        let path = derive_into_cache(&deriver, &mut cache, prefix, rel_path)?;
        let entry = lookup(&cache, &path)?;
        out.push(DerivedPublicKey {
            path: path.clone(),
            parent_fingerprint: entry.parent_fingerprint.clone(),
            extended_key: deriver.neuter(&entry.node)?,
        });
    }
    Ok(out)
}

/// Decrypt the credential, derive the master key and walk `prefix`,
/// seeding the cache with the prefix node.
fn build_cache(
    deriver: &KeyDeriver,
    hd_credential: &str,
    password: &str,
    prefix: &str,
) -> Result<HashMap<String, CacheEntry>, DeriveError> {
    let seed = decrypt_hd_credential(password, hd_credential)?;
    let master = deriver.master_from_seed(&seed.seed)?;
    let prefix_node = deriver.derive_path(&master, prefix)?;
    let mut cache = HashMap::new();
    cache.insert(
        prefix.to_string(),
        CacheEntry {
            fingerprint: None,
            parent_fingerprint: Vec::new(),
            node: prefix_node,
        },
    );
    Ok(cache)
}

/// Walk `rel_path` from the prefix node, deriving and caching any
/// missing nodes along the way. Returns the full path of the leaf.
fn derive_into_cache(
    deriver: &KeyDeriver,
    cache: &mut HashMap<String, CacheEntry>,
    prefix: &str,
    rel_path: &str,
) -> Result<String, DeriveError> {
    let mut current = prefix.to_string();
    for segment in rel_path.split('/') {
        let index = parse_segment(segment)?;
        let child_path = format!("{current}/{segment}");
        if !cache.contains_key(&child_path) {
            let parent_fingerprint = fingerprint_of(deriver, cache, &current)?;
            let child = deriver.derive_child_private(&lookup(cache, &current)?.node, index)?;
            debug!("derived {child_path}");
            cache.insert(
                child_path.clone(),
                CacheEntry {
                    fingerprint: None,
                    parent_fingerprint: parent_fingerprint.to_vec(),
                    node: child,
                },
            );
        }
        current = child_path;
    }
    Ok(current)
}

/// Fingerprint of a cached node, computing and memoizing it on first
/// use.
fn fingerprint_of(
    deriver: &KeyDeriver,
    cache: &mut HashMap<String, CacheEntry>,
    path: &str,
) -> Result<[u8; 4], DeriveError> {
    let entry = cache
        .get_mut(path)
        .ok_or(DeriveError::InvalidSeedOrCredentialFormat)?;
    match entry.fingerprint {
        Some(fingerprint) => Ok(fingerprint),
        None => {
            let fingerprint = deriver.fingerprint(&entry.node)?;
            entry.fingerprint = Some(fingerprint);
            Ok(fingerprint)
        }
    }
}

fn lookup<'a>(
    cache: &'a HashMap<String, CacheEntry>,
    path: &str,
) -> Result<&'a CacheEntry, DeriveError> {
    // Every path reaching here was inserted by build_cache or
    // derive_into_cache.
    cache
        .get(path)
        .ok_or(DeriveError::InvalidSeedOrCredentialFormat)
}
