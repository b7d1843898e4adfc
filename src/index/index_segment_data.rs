use std::sync::Arc;

use crate::{
    store::{DictionaryReader, FileReader},
    DictKey, DocId, Result,
};

use super::SegmentPosting;

/// The posting lists stored for one index in one segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostingChain {
    /// Full posting lists.
    Main,
    /// Posting lists cut down to the top docs of a truncate profile.
    Truncate(String),
    /// Bitmaps of high-frequency terms.
    Bitmap,
}

/// What the reader sees of one segment.
///
/// A built segment answers `open_dictionary` / `open_posting_file` per
/// index and chain; a building segment answers `building_index` instead.
pub trait SegmentDataProvider: Send + Sync {
    fn base_docid(&self) -> DocId;

    fn doc_count(&self) -> usize;

    /// Whether the segment is still being built, its postings held by
    /// live writers rather than dumped.
    fn is_building(&self) -> bool {
        false
    }

    /// `None` when the segment has no such chain for the index.
    fn open_dictionary(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn DictionaryReader>>>;

    fn open_posting_file(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn FileReader>>>;

    /// The not yet flushed postings of the index, for building segments.
    fn building_index(&self, _index_name: &str) -> Option<Arc<dyn BuildingIndexSegmentReader>> {
        None
    }
}

/// Term lookup in a building segment.
pub trait BuildingIndexSegmentReader: Send + Sync {
    /// Binds the live posting of `key`, if the segment has seen it.
    fn segment_posting(
        &self,
        key: DictKey,
        base_docid: DocId,
        doc_count: usize,
    ) -> Option<SegmentPosting<'_>>;

    /// Keys present in the segment, ascending.
    fn keys(&self) -> Vec<DictKey>;
}
