use crate::{
    DocFreq, DocId, DocPayload, FieldMap, Pos, TermFreq, TermPayload, TotalTermFreq,
    INVALID_DOCID, MAX_DOC_PER_RECORD,
};

use super::{PostingFormatOption, TermMeta};

/// Posting of one term in a building segment.
///
/// Doc ids are local to the segment. Readers see it through a shared
/// borrow once writing has stopped, decoding it record by record exactly
/// like a dumped posting.
pub struct PostingWriter {
    option: PostingFormatOption,
    last_docid: DocId,
    current_tf: TermFreq,
    current_field_map: FieldMap,
    total_tf: TotalTermFreq,
    term_payload: TermPayload,
    docids: Vec<DocId>,
    term_freqs: Vec<TermFreq>,
    doc_payloads: Vec<DocPayload>,
    field_maps: Vec<FieldMap>,
    positions: Vec<Pos>,
    record_ttfs: Vec<TotalTermFreq>,
}

impl PostingWriter {
    pub fn new(option: PostingFormatOption) -> Self {
        Self {
            option,
            last_docid: INVALID_DOCID,
            current_tf: 0,
            current_field_map: 0,
            total_tf: 0,
            term_payload: 0,
            docids: vec![],
            term_freqs: vec![],
            doc_payloads: vec![],
            field_maps: vec![],
            positions: vec![],
            record_ttfs: vec![],
        }
    }

    pub fn option(&self) -> PostingFormatOption {
        self.option
    }

    /// Records one occurrence of the term in the current doc.
    pub fn add_pos(&mut self, pos: Pos, field: usize) {
        self.current_tf += 1;
        if field < FieldMap::BITS as usize {
            self.current_field_map |= 1 << field;
        }
        if self.option.has_position_list() {
            self.positions.push(pos);
        }
    }

    /// Closes the current doc. A doc closed without any `add_pos` counts one
    /// occurrence.
    pub fn end_doc(&mut self, docid: DocId, doc_payload: DocPayload) {
        debug_assert!(docid > self.last_docid, "docids must be added in order");
        if self.current_tf == 0 && self.option.has_position_list() {
            self.positions.push(0);
        }
        let tf = std::cmp::max(self.current_tf, 1);
        self.docids.push(docid);
        self.term_freqs.push(tf);
        self.doc_payloads.push(doc_payload);
        self.field_maps.push(self.current_field_map);
        self.total_tf += tf as TotalTermFreq;
        if self.docids.len() % MAX_DOC_PER_RECORD == 0 {
            self.record_ttfs.push(self.total_tf);
        }

        self.last_docid = docid;
        self.current_tf = 0;
        self.current_field_map = 0;
    }

    pub fn set_term_payload(&mut self, term_payload: TermPayload) {
        self.term_payload = term_payload;
    }

    pub fn doc_freq(&self) -> DocFreq {
        self.docids.len() as DocFreq
    }

    pub fn total_term_freq(&self) -> TotalTermFreq {
        self.total_tf
    }

    pub fn term_meta(&self) -> TermMeta {
        let total_term_freq = if self.option.has_tflist() {
            self.total_tf
        } else {
            self.doc_freq() as TotalTermFreq
        };
        TermMeta::new(self.doc_freq(), total_term_freq, self.term_payload)
    }

    pub fn is_empty(&self) -> bool {
        self.docids.is_empty()
    }

    pub fn docids(&self) -> &[DocId] {
        &self.docids
    }

    pub fn term_freqs(&self) -> &[TermFreq] {
        &self.term_freqs
    }

    pub fn doc_payloads(&self) -> &[DocPayload] {
        &self.doc_payloads
    }

    pub fn field_maps(&self) -> &[FieldMap] {
        &self.field_maps
    }

    /// Absolute positions of every doc, back to back in doc order.
    pub fn positions(&self) -> &[Pos] {
        &self.positions
    }

    pub fn record_count(&self) -> usize {
        (self.docids.len() + MAX_DOC_PER_RECORD - 1) / MAX_DOC_PER_RECORD
    }

    /// Total term freq of all docs in records before `record`.
    pub fn ttf_before_record(&self, record: usize) -> TotalTermFreq {
        if record == 0 {
            0
        } else {
            self.record_ttfs[record - 1]
        }
    }
}
