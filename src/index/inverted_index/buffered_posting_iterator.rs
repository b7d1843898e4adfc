use std::sync::Arc;

use crate::{
    config::DEFAULT_STATE_POOL_SIZE,
    index::{PostingIterator, PostingIteratorBase, PostingIteratorType},
    postings::{
        DocListBlock, InDocPositionIterator, InDocPositionState, SectionAttributeReader,
        TermMatchData, TermMeta,
    },
    util::ObjectPool,
    DocId, KensakuError, Pos, Result, TermFreq, TotalTermFreq, INVALID_DOCID, INVALID_POSITION,
};

use super::{buffered_posting_decoder::BufferedPostingDecoder, SegmentPosting};

/// Iterates the docs of one term over all its segments, a record of up to
/// `MAX_DOC_PER_RECORD` docs at a time.
///
/// Seeking inside a normal record sums doc deltas from the cursor, inside a
/// reference-compressed record it binary searches. Term freqs, doc payloads
/// and field maps are only decoded when `unpack` or a position seek asks for
/// them.
pub struct BufferedPostingIterator<'a> {
    base: PostingIteratorBase<'a>,
    decoder: BufferedPostingDecoder<'a>,
    block: Box<DocListBlock>,
    current_docid: DocId,
    exhausted: bool,
    // Index of the current doc in the block.
    block_cursor: usize,
    // Normal records only: docs of the block scanned so far and the last of
    // them.
    scan_cursor: usize,
    scan_docid: DocId,
    // Segment-local total term freq of the block's docs before `ttf_cursor`.
    current_ttf: TotalTermFreq,
    ttf_cursor: usize,
    need_move_to_current_doc: bool,
    has_position_list: bool,
    state_pool_size: usize,
    state_pool: ObjectPool<InDocPositionState<'a>>,
    section_reader: Option<Arc<dyn SectionAttributeReader>>,
    position_iterator: Option<InDocPositionIterator<'a>>,
}

impl<'a> BufferedPostingIterator<'a> {
    /// Returns `None` when there is no segment posting to iterate.
    pub fn new(segment_postings: Vec<SegmentPosting<'a>>) -> Result<Option<Self>> {
        Self::with_options(segment_postings, None, DEFAULT_STATE_POOL_SIZE)
    }

    pub fn with_options(
        segment_postings: Vec<SegmentPosting<'a>>,
        section_reader: Option<Arc<dyn SectionAttributeReader>>,
        state_pool_size: usize,
    ) -> Result<Option<Self>> {
        Ok(PostingIteratorBase::init(segment_postings)?
            .map(|base| Self::with_base(base, section_reader, state_pool_size)))
    }

    pub fn with_base(
        base: PostingIteratorBase<'a>,
        section_reader: Option<Arc<dyn SectionAttributeReader>>,
        state_pool_size: usize,
    ) -> Self {
        let has_position_list = base
            .segment_postings()
            .iter()
            .any(|segment_posting| segment_posting.option().has_position_list());
        let decoder = BufferedPostingDecoder::new(base.segment_postings().clone());
        Self {
            base,
            decoder,
            block: Box::default(),
            current_docid: INVALID_DOCID,
            exhausted: false,
            block_cursor: 0,
            scan_cursor: 0,
            scan_docid: 0,
            current_ttf: 0,
            ttf_cursor: 0,
            need_move_to_current_doc: false,
            has_position_list,
            state_pool_size,
            state_pool: ObjectPool::new(state_pool_size),
            section_reader,
            position_iterator: None,
        }
    }

    pub fn base(&self) -> &PostingIteratorBase<'a> {
        &self.base
    }

    pub fn current_docid(&self) -> DocId {
        self.current_docid
    }

    fn refill(&mut self, docid: DocId) -> Result<bool> {
        if !self.decoder.decode_doc_buffer(docid, &mut self.block)? {
            return Ok(false);
        }
        self.block_cursor = 0;
        self.scan_cursor = 0;
        self.scan_docid = self.block.base_docid;
        self.current_ttf = self.block.base_ttf;
        self.ttf_cursor = 0;
        Ok(true)
    }

    fn seek_in_normal_block(&mut self, docid: DocId) -> Result<DocId> {
        let mut cursor = self.scan_cursor;
        let mut current = self.scan_docid;
        while cursor < self.block.len {
            current += self.block.doc_deltas[cursor] as DocId;
            cursor += 1;
            if current >= docid {
                self.scan_cursor = cursor;
                self.scan_docid = current;
                self.block_cursor = cursor - 1;
                return Ok(current);
            }
        }
        Err(KensakuError::IndexCollapsed(format!(
            "doc list record ends at {} before its last doc {}",
            current, self.block.last_docid
        )))
    }

    fn seek_in_reference_block(&mut self, docid: DocId) -> Result<DocId> {
        let segment_base_docid = self.block.segment_base_docid;
        let local_docid = std::cmp::max(docid - segment_base_docid, 0) as u32;
        match self.block.reference.seek(local_docid) {
            Some((cursor, local_docid)) => {
                self.block_cursor = cursor;
                Ok(segment_base_docid + local_docid as DocId)
            }
            None => Err(KensakuError::IndexCollapsed(format!(
                "reference record misses doc {} before its last doc {}",
                docid, self.block.last_docid
            ))),
        }
    }

    fn decode_tf_buffer(&mut self) -> Result<()> {
        if !self.block.tf_decoded {
            self.decoder.decode_tf_buffer(&mut self.block)?;
        }
        Ok(())
    }

    fn current_term_freq(&mut self) -> Result<TermFreq> {
        if !self.block.option.has_tflist() {
            return Ok(1);
        }
        self.decode_tf_buffer()?;
        Ok(self.block.term_freqs[self.block_cursor])
    }

    /// Accumulates the term freqs of the docs skipped since the last call so
    /// that `current_ttf` points at the current doc's first position.
    fn move_to_current_doc(&mut self) -> Result<()> {
        if !self.need_move_to_current_doc {
            return Ok(());
        }
        self.need_move_to_current_doc = false;
        if !self.block.option.has_tflist() {
            return Ok(());
        }
        self.decode_tf_buffer()?;
        for &tf in &self.block.term_freqs[self.ttf_cursor..self.block_cursor] {
            self.current_ttf += tf as TotalTermFreq;
        }
        self.ttf_cursor = self.block_cursor;
        Ok(())
    }

    fn in_doc_position_state(&mut self) -> Result<InDocPositionState<'a>> {
        self.move_to_current_doc()?;
        Ok(InDocPositionState {
            docid: self.current_docid,
            term_freq: self.current_term_freq()?,
            ttf: self.current_ttf,
            source: self.decoder.position_source(),
            section_reader: self.section_reader.clone(),
        })
    }

    fn is_positioned(&self) -> bool {
        !self.exhausted && self.current_docid != INVALID_DOCID
    }
}

impl<'a> PostingIterator<'a> for BufferedPostingIterator<'a> {
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(INVALID_DOCID);
        }
        let docid = std::cmp::max(docid, self.current_docid + 1);
        if self.block.is_empty() || self.block.last_docid < docid {
            if !self.refill(docid)? {
                self.exhausted = true;
                self.current_docid = INVALID_DOCID;
                self.position_iterator = None;
                return Ok(INVALID_DOCID);
            }
        }

        // Records of different segments may be compressed differently.
        self.current_docid = if self.block.option.is_reference_compressed() {
            self.seek_in_reference_block(docid)?
        } else {
            self.seek_in_normal_block(docid)?
        };
        self.need_move_to_current_doc = true;
        self.position_iterator = None;
        Ok(self.current_docid)
    }

    fn unpack(&mut self, match_data: &mut TermMatchData<'a>) -> Result<()> {
        match_data.reset();
        if !self.is_positioned() {
            return Ok(());
        }
        match_data.matched = true;
        match_data.docid = self.current_docid;
        match_data.tf = self.current_term_freq()?;
        if self.block.option.has_doc_payload() {
            if !self.block.doc_payload_decoded {
                self.decoder.decode_doc_payload_buffer(&mut self.block)?;
            }
            match_data.doc_payload = self.block.doc_payloads[self.block_cursor];
        }
        if self.block.option.has_fieldmap() {
            if !self.block.field_map_decoded {
                self.decoder.decode_field_map_buffer(&mut self.block)?;
            }
            match_data.field_map = self.block.field_maps[self.block_cursor];
        }
        if self.block.option.has_position_list() {
            let state = self.in_doc_position_state()?;
            let mut pooled = self.state_pool.allocate();
            *pooled = state;
            match_data.in_doc_state = Some(pooled);
        }
        Ok(())
    }

    fn seek_position(&mut self, pos: Pos) -> Result<Pos> {
        if !self.is_positioned() || !self.block.option.has_position_list() {
            return Ok(INVALID_POSITION);
        }
        if self.position_iterator.is_none() {
            let state = self.in_doc_position_state()?;
            self.position_iterator = Some(InDocPositionIterator::new(state));
        }
        match self.position_iterator.as_mut() {
            Some(position_iterator) => Ok(position_iterator.seek_position(pos)?),
            None => Ok(INVALID_POSITION),
        }
    }

    fn term_meta(&self) -> &TermMeta {
        self.base.term_meta()
    }

    fn truncate_term_meta(&self) -> &TermMeta {
        self.base.truncate_term_meta()
    }

    fn has_position(&self) -> bool {
        self.has_position_list
    }

    fn iterator_type(&self) -> PostingIteratorType {
        PostingIteratorType::Buffered
    }

    fn clone_boxed(&self) -> Box<dyn PostingIterator<'a> + 'a> {
        Box::new(Self::with_base(
            self.base.clone(),
            self.section_reader.clone(),
            self.state_pool_size,
        ))
    }

    fn reset(&mut self) {
        self.decoder.reset();
        self.block.clear();
        self.current_docid = INVALID_DOCID;
        self.exhausted = false;
        self.block_cursor = 0;
        self.scan_cursor = 0;
        self.scan_docid = 0;
        self.current_ttf = 0;
        self.ttf_cursor = 0;
        self.need_move_to_current_doc = false;
        self.position_iterator = None;
    }
}
