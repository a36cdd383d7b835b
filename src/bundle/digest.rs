//! Truncated SHA-1 digests used as partition integrity tags

use sha1::{Digest, Sha1};

/// Number of hex characters kept from the full digest
pub const SHORT_DIGEST_LEN: usize = 8;

/// Lowercase first 8 hex characters of the SHA-1 of `data`
pub fn short_sha1(data: &[u8]) -> String {
    let digest = Sha1::digest(data);
    let mut text = hex::encode(digest);
    text.truncate(SHORT_DIGEST_LEN);
    text
}
