use std::sync::Arc;

use crate::{
    index::{BuildingIndexSegmentReader, SegmentPosting},
    DictKey, DocId,
};

struct BuildingSegment {
    base_docid: DocId,
    doc_count: usize,
    reader: Arc<dyn BuildingIndexSegmentReader>,
}

/// Lookups over the building segments of one index.
///
/// Segments are registered while the owning reader opens, in ascending base
/// doc id order, and only read afterwards.
#[derive(Default)]
pub struct BuildingIndexReader {
    segments: Vec<BuildingSegment>,
}

impl BuildingIndexReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment_reader(
        &mut self,
        base_docid: DocId,
        doc_count: usize,
        reader: Option<Arc<dyn BuildingIndexSegmentReader>>,
    ) {
        if let Some(reader) = reader {
            self.segments.push(BuildingSegment {
                base_docid,
                doc_count,
                reader,
            });
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends the posting of `key` in every building segment holding it, in
    /// registration order.
    pub fn segment_postings<'a>(&'a self, key: DictKey, postings: &mut Vec<SegmentPosting<'a>>) {
        for segment in &self.segments {
            if let Some(posting) =
                segment
                    .reader
                    .segment_posting(key, segment.base_docid, segment.doc_count)
            {
                postings.push(posting);
            }
        }
    }

    pub fn keys(&self) -> Vec<DictKey> {
        let mut keys: Vec<_> = self
            .segments
            .iter()
            .flat_map(|segment| segment.reader.keys())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}
