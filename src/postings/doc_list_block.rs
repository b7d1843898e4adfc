use crate::{DocId, DocPayload, FieldMap, TermFreq, TotalTermFreq, MAX_DOC_PER_RECORD};

use super::{compression::ReferenceCompressIntReader, PostingFormatOption};

/// One decoded record of a posting.
///
/// Doc ids are kept as deltas from `base_docid` for normal records and in
/// `reference` for reference-compressed ones. Doc ids in the block are
/// global. The tf, doc payload and field map buffers are filled lazily, the
/// `*_decoded` flags tell which ones hold the current record.
pub struct DocListBlock {
    pub len: usize,
    pub option: PostingFormatOption,
    pub segment_base_docid: DocId,
    pub base_docid: DocId,
    pub last_docid: DocId,
    /// Total term freq of the segment's docs before this record.
    pub base_ttf: TotalTermFreq,
    pub doc_deltas: [u32; MAX_DOC_PER_RECORD],
    pub reference: ReferenceCompressIntReader,
    pub term_freqs: [TermFreq; MAX_DOC_PER_RECORD],
    pub doc_payloads: [DocPayload; MAX_DOC_PER_RECORD],
    pub field_maps: [FieldMap; MAX_DOC_PER_RECORD],
    pub tf_decoded: bool,
    pub doc_payload_decoded: bool,
    pub field_map_decoded: bool,
}

impl Default for DocListBlock {
    fn default() -> Self {
        Self {
            len: 0,
            option: PostingFormatOption::default(),
            segment_base_docid: 0,
            base_docid: 0,
            last_docid: 0,
            base_ttf: 0,
            doc_deltas: [0; MAX_DOC_PER_RECORD],
            reference: ReferenceCompressIntReader::default(),
            term_freqs: [0; MAX_DOC_PER_RECORD],
            doc_payloads: [0; MAX_DOC_PER_RECORD],
            field_maps: [0; MAX_DOC_PER_RECORD],
            tf_decoded: false,
            doc_payload_decoded: false,
            field_map_decoded: false,
        }
    }
}

impl DocListBlock {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Starts a new record, invalidating the lazily decoded buffers.
    pub fn reset_record(&mut self, len: usize) {
        self.len = len;
        self.tf_decoded = false;
        self.doc_payload_decoded = false;
        self.field_map_decoded = false;
    }

    pub fn clear(&mut self) {
        self.reset_record(0);
    }

    /// Shifts local doc ids of a freshly decoded record into the global doc
    /// id space.
    pub fn rebase(&mut self, segment_base_docid: DocId) {
        self.segment_base_docid = segment_base_docid;
        self.base_docid += segment_base_docid;
        self.last_docid += segment_base_docid;
    }

    /// Sum of the deltas of a normal record, relative to `base_docid`.
    pub fn delta_sum(&self) -> DocId {
        self.doc_deltas[..self.len].iter().sum::<u32>() as DocId
    }
}
