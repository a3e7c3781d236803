//! String Hashing
//!
//! Two hashes live here:
//! - the 32-bit rolling hash that turns `"{deck}|{day}"` into a shuffle seed
//! - a SHA-256 digest used for short share-link identifiers

use sha2::{Sha256, Digest};

/// Digest output type (256 bits / 32 bytes)
pub type Digest256 = [u8; 32];

/// Hash a string into a non-negative 32-bit seed.
///
/// Rolling hash over UTF-16 code units: `h = h * 31 + unit`, wrapped to a
/// signed 32-bit integer at every step, absolute value at the end.
/// The multiply is done as `(h << 5) - h` to match the browser client.
pub fn hash_string_to_seed(s: &str) -> u32 {
    let mut hash: i32 = 0;
    for unit in s.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash.unsigned_abs()
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest256 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Short hex identifier for `data`: the first `len` hex chars of its digest.
pub fn short_hex_id(domain: &[u8], data: &[u8], len: usize) -> String {
    let digest = hash_with_domain(domain, data);
    let mut id = hex::encode(digest);
    id.truncate(len.min(64));
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hash_known_values() {
        assert_eq!(hash_string_to_seed(""), 0);
        assert_eq!(hash_string_to_seed("a"), 97);
        assert_eq!(hash_string_to_seed("nfl-playoffs|2024-01-15"), 78815534);
        assert_eq!(hash_string_to_seed("nfl-playoffs|2024-01-16"), 78815535);
        assert_eq!(hash_string_to_seed("demo|2024-01-15"), 339624476);
    }

    #[test]
    fn test_seed_hash_wraps_long_input() {
        // Long input overflows i32 many times; must not panic
        let long = "x".repeat(10_000);
        let a = hash_string_to_seed(&long);
        let b = hash_string_to_seed(&long);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_hash_min_value_is_representable() {
        // |i32::MIN| does not fit in i32; the u32 result carries it.
        assert_eq!(i32::MIN.unsigned_abs(), 2_147_483_648);
    }

    #[test]
    fn test_short_hex_id() {
        let a = short_hex_id(b"link", b"token", 10);
        let b = short_hex_id(b"link", b"token", 10);
        let c = short_hex_id(b"link", b"other", 10);
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_domain_separation() {
        assert_ne!(
            hash_with_domain(b"A", b"data"),
            hash_with_domain(b"B", b"data")
        );
    }
}
