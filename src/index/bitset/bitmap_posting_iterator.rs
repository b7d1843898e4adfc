use crate::{
    index::{
        MultiSegmentIterator, PostingIterator, PostingIteratorBase, PostingIteratorType,
        SegmentPosting, SegmentPostingData, SingleIterator,
    },
    postings::{BitmapPosting, TermMatchData, TermMeta},
    DocId, KensakuError, Result, INVALID_DOCID,
};

/// Bitmap posting of a term in one segment.
pub struct SingleBitmapPostingIterator {
    base_docid: DocId,
    doc_count: usize,
    posting: BitmapPosting,
    current_docid: DocId,
}

impl SingleBitmapPostingIterator {
    fn local_docid(&self, docid: DocId) -> Option<usize> {
        let local_docid = docid - self.base_docid;
        if local_docid < 0 || local_docid as usize >= self.doc_count {
            None
        } else {
            Some(local_docid as usize)
        }
    }

    pub fn test(&self, docid: DocId) -> bool {
        self.local_docid(docid)
            .map_or(false, |local_docid| self.posting.bitset.contains(local_docid))
    }
}

impl<'a> SingleIterator<'a> for SingleBitmapPostingIterator {
    fn open(segment_posting: &SegmentPosting<'a>) -> Result<Self> {
        let posting = match segment_posting.data() {
            SegmentPostingData::SliceList(slice_list) => BitmapPosting::load(slice_list)?,
            _ => {
                return Err(KensakuError::IndexCollapsed(format!(
                    "bitmap posting of segment at {} is not dumped",
                    segment_posting.base_docid()
                )))
            }
        };
        Ok(Self {
            base_docid: segment_posting.base_docid(),
            doc_count: segment_posting.doc_count(),
            posting,
            current_docid: INVALID_DOCID,
        })
    }

    fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        let local_docid = std::cmp::max(docid - self.base_docid, 0) as usize;
        self.current_docid = match self.posting.bitset.next_set_bit(local_docid) {
            Some(found) if found < self.doc_count => self.base_docid + found as DocId,
            _ => INVALID_DOCID,
        };
        Ok(self.current_docid)
    }

    fn unpack(&self, match_data: &mut TermMatchData<'a>) {
        match_data.matched = true;
        match_data.docid = self.current_docid;
        match_data.tf = 1;
    }

    fn reset(&mut self) {
        self.current_docid = INVALID_DOCID;
    }
}

/// Iterates the bitmap chain of a high-frequency term over all segments.
///
/// Besides seeking, `test` answers membership of any doc without moving the
/// seek cursor.
pub struct BitmapPostingIterator<'a> {
    inner: MultiSegmentIterator<'a, SingleBitmapPostingIterator>,
    test_cursor: usize,
}

impl<'a> BitmapPostingIterator<'a> {
    pub fn new(segment_postings: Vec<SegmentPosting<'a>>) -> Result<Option<Self>> {
        Ok(PostingIteratorBase::init(segment_postings)?.map(Self::with_base))
    }

    pub fn with_base(base: PostingIteratorBase<'a>) -> Self {
        Self {
            inner: MultiSegmentIterator::new(base),
            test_cursor: 0,
        }
    }

    pub fn test(&mut self, docid: DocId) -> Result<bool> {
        let segment_postings = self.inner.base().segment_postings().clone();
        if docid < segment_postings[self.test_cursor].base_docid() {
            self.test_cursor = 0;
        }
        while self.test_cursor + 1 < segment_postings.len()
            && docid >= segment_postings[self.test_cursor + 1].base_docid()
        {
            self.test_cursor += 1;
        }
        Ok(self.inner.single(self.test_cursor)?.test(docid))
    }
}

impl<'a> PostingIterator<'a> for BitmapPostingIterator<'a> {
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        self.inner.inner_seek_doc(docid)
    }

    fn unpack(&mut self, match_data: &mut TermMatchData<'a>) -> Result<()> {
        match_data.reset();
        if let Some(single) = self.inner.current_single() {
            single.unpack(match_data);
        }
        Ok(())
    }

    fn term_meta(&self) -> &TermMeta {
        self.inner.base().term_meta()
    }

    fn truncate_term_meta(&self) -> &TermMeta {
        self.inner.base().truncate_term_meta()
    }

    fn iterator_type(&self) -> PostingIteratorType {
        PostingIteratorType::Bitmap
    }

    fn clone_boxed(&self) -> Box<dyn PostingIterator<'a> + 'a> {
        Box::new(Self::with_base(self.inner.base().clone()))
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.test_cursor = 0;
    }
}
