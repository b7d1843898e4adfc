use crate::{index::SegmentPosting, DocId};

/// Postings of several keys within one segment.
#[derive(Clone)]
pub struct SegmentMultiPosting<'a> {
    base_docid: DocId,
    doc_count: usize,
    postings: Vec<SegmentPosting<'a>>,
}

impl<'a> SegmentMultiPosting<'a> {
    pub fn new(base_docid: DocId, doc_count: usize, postings: Vec<SegmentPosting<'a>>) -> Self {
        Self {
            base_docid,
            doc_count,
            postings,
        }
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn postings(&self) -> &[SegmentPosting<'a>] {
        &self.postings
    }

    pub fn posting_count(&self) -> usize {
        self.postings.len()
    }

    /// Regroups per-key posting lists by segment, in ascending base doc id
    /// order. Keys missing from a segment are simply absent from its group.
    pub fn group_by_segment(postings_by_key: Vec<Vec<SegmentPosting<'a>>>) -> Vec<Self> {
        let mut segments: Vec<Self> = vec![];
        let mut all: Vec<_> = postings_by_key.into_iter().flatten().collect();
        all.sort_by_key(|posting| posting.base_docid());
        for posting in all {
            match segments.last_mut() {
                Some(segment) if segment.base_docid == posting.base_docid() => {
                    segment.postings.push(posting)
                }
                _ => segments.push(Self::new(
                    posting.base_docid(),
                    posting.doc_count(),
                    vec![posting],
                )),
            }
        }
        segments
    }
}
