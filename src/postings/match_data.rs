use crate::{util::Pooled, DocId, DocPayload, FieldMap, TermFreq, INVALID_DOCID};

use super::{InDocPositionIterator, InDocPositionState};

/// What `unpack` reports about the current doc of a posting iterator.
pub struct TermMatchData<'a> {
    pub matched: bool,
    pub docid: DocId,
    pub tf: TermFreq,
    pub doc_payload: DocPayload,
    pub field_map: FieldMap,
    pub in_doc_state: Option<Pooled<InDocPositionState<'a>>>,
}

impl<'a> Default for TermMatchData<'a> {
    fn default() -> Self {
        Self {
            matched: false,
            docid: INVALID_DOCID,
            tf: 0,
            doc_payload: 0,
            field_map: 0,
            in_doc_state: None,
        }
    }
}

impl<'a> TermMatchData<'a> {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn has_field(&self, field: usize) -> bool {
        field < FieldMap::BITS as usize && self.field_map & (1 << field) != 0
    }

    pub fn position_iterator(&self) -> Option<InDocPositionIterator<'a>> {
        self.in_doc_state
            .as_ref()
            .map(|state| state.position_iterator())
    }
}
