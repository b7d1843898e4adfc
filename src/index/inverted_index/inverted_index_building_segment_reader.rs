use ahash::AHashMap;

use crate::{
    index::{BuildingIndexSegmentReader, SegmentPosting},
    postings::{PostingFormatOption, PostingWriter},
    DictKey, DocId,
};

/// Posting writers of one index in a building segment, by dictionary key.
pub struct InvertedIndexBuildingSegmentReader {
    option: PostingFormatOption,
    postings: AHashMap<DictKey, PostingWriter>,
}

impl InvertedIndexBuildingSegmentReader {
    pub fn new(option: PostingFormatOption) -> Self {
        Self {
            option,
            postings: AHashMap::new(),
        }
    }

    pub fn option(&self) -> PostingFormatOption {
        self.option
    }

    /// The writer of `key`, created on first use.
    pub fn posting_writer(&mut self, key: DictKey) -> &mut PostingWriter {
        let option = self.option;
        self.postings
            .entry(key)
            .or_insert_with(|| PostingWriter::new(option))
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

impl BuildingIndexSegmentReader for InvertedIndexBuildingSegmentReader {
    fn segment_posting(
        &self,
        key: DictKey,
        base_docid: DocId,
        doc_count: usize,
    ) -> Option<SegmentPosting<'_>> {
        self.postings
            .get(&key)
            .filter(|posting_writer| !posting_writer.is_empty())
            .map(|posting_writer| SegmentPosting::new_realtime(base_docid, doc_count, posting_writer))
    }

    fn keys(&self) -> Vec<DictKey> {
        let mut keys: Vec<_> = self
            .postings
            .iter()
            .filter(|(_, posting_writer)| !posting_writer.is_empty())
            .map(|(&key, _)| key)
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        index::BuildingIndexSegmentReader,
        postings::{PostingFormatOption, TermMeta},
        Result,
    };

    use super::InvertedIndexBuildingSegmentReader;

    #[test]
    fn test_segment_posting() -> Result<()> {
        let option = PostingFormatOption::builder().with_tflist().build();
        let mut reader = InvertedIndexBuildingSegmentReader::new(option);
        reader.posting_writer(9).end_doc(1, 0);
        reader.posting_writer(3).end_doc(0, 0);
        reader.posting_writer(3).end_doc(2, 0);
        // created but never written
        reader.posting_writer(5);

        assert_eq!(reader.keys(), vec![3, 9]);
        let posting = reader.segment_posting(3, 100, 10).unwrap();
        assert_eq!(posting.base_docid(), 100);
        assert!(posting.is_realtime_segment());
        assert_eq!(posting.current_term_meta()?, TermMeta::new(2, 2, 0));
        assert!(reader.segment_posting(5, 100, 10).is_none());
        assert!(reader.segment_posting(7, 100, 10).is_none());
        Ok(())
    }
}
