use std::hash::Hasher;

use crate::DictKey;

/// Maps index terms to dictionary keys.
#[derive(Default)]
pub struct TokenHasher {}

impl TokenHasher {
    pub fn hash_word(&self, word: &str) -> DictKey {
        self.hash_bytes(word.as_bytes())
    }

    pub fn hash_bytes(&self, token: &[u8]) -> DictKey {
        let mut hasher = ahash::AHasher::default();
        hasher.write(token);
        hasher.finish()
    }

    /// Key of one value of a range index.
    pub fn hash_u64(&self, value: u64) -> DictKey {
        self.hash_bytes(&value.to_le_bytes())
    }
}
