//! Cache-key hashing.

use blake3::Hasher;

/// Kind tag for rubric lookups.
pub const RUBRIC_KEY_KIND: &str = "rubric";
/// Kind tag for example lookups.
pub const EXAMPLE_KEY_KIND: &str = "example";

/// Hashes a lookup into a fixed-size cache key.
///
/// The kind and every part are prefixed with their byte length, so no choice of part
/// contents can make two different lookups hash the same input.
#[inline]
pub fn lookup_key(kind: &str, parts: &[&str]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    update_prefixed(&mut hasher, kind);
    for part in parts {
        update_prefixed(&mut hasher, part);
    }
    *hasher.finalize().as_bytes()
}

#[inline]
fn update_prefixed(hasher: &mut Hasher, part: &str) {
    hasher.update(&(part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}

/// Short hex prefix of a key, for log fields.
#[inline]
pub fn key_prefix(key: &[u8; 32]) -> String {
    key[..6].iter().map(|b| format!("{:02x}", b)).collect()
}
