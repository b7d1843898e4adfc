use crate::{postings::TermMatchData, DocId, Result, INVALID_DOCID};

use super::{PostingIteratorBase, SegmentPosting};

/// Iterator over the posting of one term in a single segment, in global doc
/// ids.
pub trait SingleIterator<'a>: Sized {
    fn open(segment_posting: &SegmentPosting<'a>) -> Result<Self>;

    /// First doc `>= docid` in the segment, or `INVALID_DOCID`.
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId>;

    fn unpack(&self, match_data: &mut TermMatchData<'a>);

    fn reset(&mut self);
}

/// Walks the segments of a term one at a time, each through its own
/// `SingleIterator`.
///
/// Single iterators are opened when the cursor first reaches their segment
/// and kept until the outer iterator drops.
pub struct MultiSegmentIterator<'a, S> {
    base: PostingIteratorBase<'a>,
    singles: Vec<Option<S>>,
    cursor: usize,
    current_docid: DocId,
}

impl<'a, S: SingleIterator<'a>> MultiSegmentIterator<'a, S> {
    pub fn new(base: PostingIteratorBase<'a>) -> Self {
        let segment_count = base.segment_postings().len();
        Self {
            base,
            singles: (0..segment_count).map(|_| None).collect(),
            cursor: 0,
            current_docid: INVALID_DOCID,
        }
    }

    pub fn base(&self) -> &PostingIteratorBase<'a> {
        &self.base
    }

    pub fn current_docid(&self) -> DocId {
        self.current_docid
    }

    pub fn segment_count(&self) -> usize {
        self.singles.len()
    }

    /// The single iterator of segment `index`, opened on first use.
    pub fn single(&mut self, index: usize) -> Result<&mut S> {
        let slot = &mut self.singles[index];
        let single = match slot.take() {
            Some(single) => single,
            None => S::open(&self.base.segment_postings()[index])?,
        };
        Ok(slot.insert(single))
    }

    /// The single iterator positioned on the current doc.
    pub fn current_single(&self) -> Option<&S> {
        if self.current_docid == INVALID_DOCID {
            return None;
        }
        self.singles.get(self.cursor).and_then(Option::as_ref)
    }

    pub fn move_to_next_segment(&mut self) -> bool {
        if self.cursor < self.singles.len() {
            self.cursor += 1;
        }
        self.cursor < self.singles.len()
    }

    pub fn inner_seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        let docid = std::cmp::max(docid, self.current_docid + 1);
        while self.cursor < self.singles.len() {
            let found = self.single(self.cursor)?.seek_doc(docid)?;
            if found != INVALID_DOCID {
                self.current_docid = found;
                return Ok(found);
            }
            if !self.move_to_next_segment() {
                break;
            }
        }
        self.current_docid = INVALID_DOCID;
        Ok(INVALID_DOCID)
    }

    pub fn reset(&mut self) {
        for single in self.singles.iter_mut().flatten() {
            single.reset();
        }
        self.cursor = 0;
        self.current_docid = INVALID_DOCID;
    }
}
