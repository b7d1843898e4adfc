use crate::{index::PostingIterator, DictKey, Result};

use super::NormalIndexReader;

/// A reader that can enumerate its dictionary keys and open each of them.
pub trait KeyLookup {
    /// Ascending and deduplicated.
    fn keys(&self) -> Vec<DictKey>;

    fn lookup_key<'a>(&'a self, key: DictKey) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>>;
}

impl KeyLookup for NormalIndexReader {
    fn keys(&self) -> Vec<DictKey> {
        NormalIndexReader::keys(self)
    }

    fn lookup_key<'a>(&'a self, key: DictKey) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        NormalIndexReader::lookup_key(self, key)
    }
}

/// Walks every key of a reader in ascending order together with its
/// posting iterator.
pub struct KeyIterator<'a, R: KeyLookup> {
    reader: &'a R,
    keys: Vec<DictKey>,
    cursor: usize,
}

impl<'a, R: KeyLookup> KeyIterator<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self {
            reader,
            keys: reader.keys(),
            cursor: 0,
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl<'a, R: KeyLookup> Iterator for KeyIterator<'a, R> {
    type Item = Result<(DictKey, Box<dyn PostingIterator<'a> + 'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.keys.len() {
            let key = self.keys[self.cursor];
            self.cursor += 1;
            match self.reader.lookup_key(key) {
                Ok(Some(iterator)) => return Some(Ok((key, iterator))),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
