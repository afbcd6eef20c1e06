//! SHA-256 checksums for comparing serialized tables across runs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Serialize `value` to canonical JSON and hash the bytes.
///
/// Map ordering is whatever `value` iterates in, so callers hash tables
/// built from ordered collections.
pub fn checksum_of<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(compute_checksum("abc"), compute_checksum("abc"));
        assert_ne!(compute_checksum("abc"), compute_checksum("abd"));
    }

    #[test]
    fn test_checksum_of_matches_string_hash() {
        let value = vec![1, 2, 3];
        assert_eq!(checksum_of(&value).unwrap(), compute_checksum("[1,2,3]"));
    }
}
