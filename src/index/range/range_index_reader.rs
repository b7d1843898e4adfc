use crate::{
    config::IndexConfig,
    index::{inverted_index::NormalIndexReader, IndexReader, PostingIterator, PostingType},
    query::Term,
    DictKey, KensakuError, Result,
};

use super::{RangePostingIterator, RangeQueryEncoder, SegmentMultiPosting};

/// Most values a single range term may expand to.
pub const MAX_RANGE_KEYS: u64 = 1 << 16;

/// Range and date indexes: every value is a key of its own, and a range term
/// is the union of the values it covers.
pub struct RangeIndexReader {
    reader: NormalIndexReader,
    range_query_encoder: RangeQueryEncoder,
}

impl RangeIndexReader {
    pub fn new(reader: NormalIndexReader) -> Self {
        Self {
            reader,
            range_query_encoder: RangeQueryEncoder::default(),
        }
    }

    pub fn reader(&self) -> &NormalIndexReader {
        &self.reader
    }

    /// Docs holding any of `keys`, each returned once.
    pub fn lookup_keys<'a>(
        &'a self,
        keys: &[DictKey],
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let postings_by_key = keys
            .iter()
            .map(|&key| self.reader.segment_postings_by_key(key))
            .collect::<Result<Vec<_>>>()?;
        let segments = SegmentMultiPosting::group_by_segment(postings_by_key);
        Ok(RangePostingIterator::new(segments)?
            .map(|iterator| Box::new(iterator) as Box<dyn PostingIterator<'a> + 'a>))
    }

    /// Docs with a value in `[left, right]`.
    pub fn lookup_range<'a>(
        &'a self,
        left: u64,
        right: u64,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        if left > right {
            return Ok(None);
        }
        if right - left >= MAX_RANGE_KEYS {
            return Err(KensakuError::InvalidArgument(format!(
                "range [{}, {}] of index `{}` covers more than {} values",
                left, right, self.reader.config().index_name, MAX_RANGE_KEYS
            )));
        }
        let token_hasher = self.reader.token_hasher();
        let keys: Vec<_> = (left..=right)
            .map(|value| token_hasher.hash_u64(value))
            .collect();
        self.lookup_keys(&keys)
    }
}

impl IndexReader for RangeIndexReader {
    fn lookup<'a>(
        &'a self,
        term: &Term,
        _posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let (left, right) = self.range_query_encoder.decode(term.word())?;
        self.lookup_range(left, right)
    }

    fn index_config(&self) -> &IndexConfig {
        self.reader.config()
    }
}
