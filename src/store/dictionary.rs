use std::io;

use crate::DictKey;

/// Maps a dictionary key to the opaque dictionary value of one posting
/// chain in one segment.
pub trait DictionaryReader: Send + Sync {
    fn lookup(&self, key: DictKey) -> io::Result<Option<u64>>;

    /// A fresh pass over all `(key, value)` pairs in ascending key order.
    fn iter(&self) -> Box<dyn Iterator<Item = (DictKey, u64)> + '_>;
}

/// In-memory dictionary kept as a sorted array.
#[derive(Default, Clone)]
pub struct SortedDictionary {
    entries: Vec<(DictKey, u64)>,
}

impl SortedDictionary {
    pub fn new(mut entries: Vec<(DictKey, u64)>) -> Self {
        entries.sort_unstable_by_key(|&(key, _)| key);
        entries.dedup_by_key(|&mut (key, _)| key);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DictionaryReader for SortedDictionary {
    fn lookup(&self, key: DictKey) -> io::Result<Option<u64>> {
        Ok(self
            .entries
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|i| self.entries[i].1))
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (DictKey, u64)> + '_> {
        Box::new(self.entries.iter().copied())
    }
}
