use std::rc::Rc;

use crate::{
    postings::{MultiSegmentTermMetaCalculator, TermMatchData, TermMeta, TermPostingInfo},
    DocId, Pos, Result, INVALID_POSITION,
};

use super::SegmentPosting;

/// Which chain a lookup reads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PostingType {
    #[default]
    Normal,
    Bitmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingIteratorType {
    Buffered,
    Bitmap,
    Range,
    Spatial,
}

/// Forward-only cursor over the docs of a posting.
///
/// `seek_doc` returns the first doc `>=` the target and after the current
/// one, or `INVALID_DOCID` once the posting is exhausted. I/O failures come
/// back as errors, never as exhaustion.
pub trait PostingIterator<'a> {
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId>;

    /// Fills `match_data` for the doc the last `seek_doc` returned.
    fn unpack(&mut self, match_data: &mut TermMatchData<'a>) -> Result<()>;

    fn seek_position(&mut self, _pos: Pos) -> Result<Pos> {
        Ok(INVALID_POSITION)
    }

    /// Statistics of the full chain.
    fn term_meta(&self) -> &TermMeta;

    /// Statistics of the chain actually iterated, which is shorter than the
    /// full one when it is truncated.
    fn truncate_term_meta(&self) -> &TermMeta;

    fn has_position(&self) -> bool {
        false
    }

    fn iterator_type(&self) -> PostingIteratorType;

    /// A fresh iterator over the same postings, positioned before the first
    /// doc. Opening it performs no I/O.
    fn clone_boxed(&self) -> Box<dyn PostingIterator<'a> + 'a>;

    /// Rewinds to before the first doc, keeping the allocated buffers.
    fn reset(&mut self);
}

/// Segment postings of one term plus their aggregated term metas, shared by
/// every iterator over them.
#[derive(Clone)]
pub struct PostingIteratorBase<'a> {
    segment_postings: Rc<[SegmentPosting<'a>]>,
    term_meta: TermMeta,
    truncate_term_meta: TermMeta,
}

impl<'a> PostingIteratorBase<'a> {
    /// Returns `None` for an empty posting list. Segment postings must be in
    /// ascending base doc id order.
    pub fn init(segment_postings: Vec<SegmentPosting<'a>>) -> Result<Option<Self>> {
        if segment_postings.is_empty() {
            return Ok(None);
        }
        let mut main_chain = MultiSegmentTermMetaCalculator::default();
        let mut current_chain = MultiSegmentTermMetaCalculator::default();
        for segment_posting in &segment_postings {
            main_chain.add_segment(&segment_posting.main_chain_term_meta()?);
            current_chain.add_segment(&segment_posting.current_term_meta()?);
        }
        Ok(Some(Self {
            segment_postings: segment_postings.into(),
            term_meta: main_chain.term_meta(),
            truncate_term_meta: current_chain.term_meta(),
        }))
    }

    pub fn segment_postings(&self) -> &Rc<[SegmentPosting<'a>]> {
        &self.segment_postings
    }

    pub fn term_meta(&self) -> &TermMeta {
        &self.term_meta
    }

    pub fn truncate_term_meta(&self) -> &TermMeta {
        &self.truncate_term_meta
    }

    /// Re-reads every dumped posting's header to sum its section sizes.
    pub fn term_posting_info(&self) -> Result<TermPostingInfo> {
        let mut info = TermPostingInfo::default();
        for segment_posting in self.segment_postings.iter() {
            if let Some(segment_info) = segment_posting.term_posting_info()? {
                info.add(&segment_info);
            }
        }
        Ok(info)
    }
}
