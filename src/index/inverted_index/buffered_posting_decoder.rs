use std::rc::Rc;

use crate::{
    postings::{DocListBlock, PositionSource},
    DocId, Result, INVALID_DOCID,
};

use super::{buffered_segment_decoder::BufferedSegmentDecoder, SegmentPosting};

/// Decodes the records of a term across all its segments, opening each
/// segment's decoder only when the cursor reaches it.
pub struct BufferedPostingDecoder<'a> {
    decoder: Option<BufferedSegmentDecoder<'a>>,
    cursor: usize,
    postings: Rc<[SegmentPosting<'a>]>,
}

impl<'a> BufferedPostingDecoder<'a> {
    pub fn new(segment_postings: Rc<[SegmentPosting<'a>]>) -> Self {
        Self {
            decoder: None,
            cursor: 0,
            postings: segment_postings,
        }
    }

    /// Decodes the first record holding a doc `>= docid`, crossing segment
    /// boundaries as needed. Returns false once every segment is exhausted.
    pub fn decode_doc_buffer(
        &mut self,
        docid: DocId,
        doc_list_block: &mut DocListBlock,
    ) -> Result<bool> {
        loop {
            if self.decoder.is_none() && !self.move_to_segment(docid)? {
                return Ok(false);
            }
            if let Some(decoder) = self.decoder.as_mut() {
                if decoder.decode_doc_buffer(docid, doc_list_block)? {
                    return Ok(true);
                }
            }
            self.decoder = None;
        }
    }

    pub fn decode_tf_buffer(&mut self, doc_list_block: &mut DocListBlock) -> Result<()> {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.decode_tf_buffer(doc_list_block)?;
        }
        Ok(())
    }

    pub fn decode_doc_payload_buffer(&mut self, doc_list_block: &mut DocListBlock) -> Result<()> {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.decode_doc_payload_buffer(doc_list_block)?;
        }
        Ok(())
    }

    pub fn decode_field_map_buffer(&mut self, doc_list_block: &mut DocListBlock) -> Result<()> {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.decode_field_map_buffer(doc_list_block)?;
        }
        Ok(())
    }

    /// Positions of the segment the current record belongs to.
    pub fn position_source(&self) -> Option<PositionSource<'a>> {
        self.decoder
            .as_ref()
            .and_then(|decoder| decoder.position_source())
    }

    pub fn reset(&mut self) {
        self.decoder = None;
        self.cursor = 0;
    }

    fn move_to_segment(&mut self, docid: DocId) -> Result<bool> {
        let cursor = self.locate_segment(self.cursor, docid);
        if cursor >= self.postings.len() {
            self.cursor = self.postings.len();
            return Ok(false);
        }
        self.decoder = Some(BufferedSegmentDecoder::open(&self.postings[cursor])?);
        self.cursor = cursor + 1;
        Ok(true)
    }

    fn locate_segment(&self, cursor: usize, docid: DocId) -> usize {
        let curr_seg_base_docid = self.segment_base_docid(cursor);
        if curr_seg_base_docid == INVALID_DOCID {
            return cursor;
        }
        let mut cursor = cursor;
        let mut next_seg_base_docid = self.segment_base_docid(cursor + 1);
        while next_seg_base_docid != INVALID_DOCID && docid >= next_seg_base_docid {
            cursor += 1;
            next_seg_base_docid = self.segment_base_docid(cursor + 1);
        }
        cursor
    }

    fn segment_base_docid(&self, cursor: usize) -> DocId {
        if cursor >= self.postings.len() {
            INVALID_DOCID
        } else {
            self.postings[cursor].base_docid()
        }
    }
}
