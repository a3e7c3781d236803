//! Short Links
//!
//! Maps a run token to a short id and back. The id is content-derived, so
//! shortening the same token twice gives the same id.

use crate::core::hash::short_hex_id;
use crate::session::store::{link_key, KeyValueStore, StoreError};

/// Length of a short id in hex characters.
pub const SHORT_ID_LEN: usize = 10;

const LINK_DOMAIN: &[u8] = b"RECALL_SHORT_LINK_V1";

/// Short id for `token`, without storing anything.
pub fn short_id(token: &str) -> String {
    short_hex_id(LINK_DOMAIN, token.as_bytes(), SHORT_ID_LEN)
}

/// Link shortener over any key-value store.
#[derive(Debug)]
pub struct ShortLinks<S> {
    store: S,
}

impl<S: KeyValueStore> ShortLinks<S> {
    /// Shortener backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store `token` and return its short id.
    pub fn shorten(&mut self, token: &str) -> Result<String, StoreError> {
        let id = short_id(token);
        let key = link_key(&id);
        if self.store.get(&key)?.as_deref() != Some(token) {
            self.store.set(&key, token)?;
            tracing::debug!(%id, "stored short link");
        }
        Ok(id)
    }

    /// Token stored under `id`, if any.
    pub fn resolve(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.store.get(&link_key(id.trim()))
    }

    /// Underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryStore;

    #[test]
    fn test_shorten_and_resolve() {
        let mut links = ShortLinks::new(MemoryStore::new());
        let id = links.shorten("WzEyMF0").unwrap();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(links.resolve(&id).unwrap().as_deref(), Some("WzEyMF0"));
        assert_eq!(links.resolve("0000000000").unwrap(), None);
    }

    #[test]
    fn test_shorten_is_idempotent() {
        let mut links = ShortLinks::new(MemoryStore::new());
        let a = links.shorten("token-a").unwrap();
        let again = links.shorten("token-a").unwrap();
        let b = links.shorten("token-b").unwrap();
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(links.into_inner().len(), 2);
    }
}
