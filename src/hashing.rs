use md5::Md5;
use sha2::{Digest, Sha256};

/// Content-addressed record id: MD5 hex digest of the question followed by the link.
///
/// An absent link hashes the same as an empty one.
pub fn record_id(question: &str, link: Option<&str>) -> String {
    let mut hasher = Md5::new();
    hasher.update(question.as_bytes());
    hasher.update(link.unwrap_or("").as_bytes());
    hex::encode(hasher.finalize())
}

/// Stable integer surrogate for a cleaned link: the first 64 bits of its SHA-256 digest.
pub fn link_id(link_cleaned: &str) -> u64 {
    let digest = Sha256::digest(link_cleaned.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
