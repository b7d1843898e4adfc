use std::{
    collections::{binary_heap::PeekMut, BinaryHeap},
    rc::Rc,
};

use crate::{
    config::DEFAULT_STATE_POOL_SIZE,
    index::{inverted_index::BufferedPostingIterator, PostingIterator, PostingIteratorType},
    postings::{MultiSegmentTermMetaCalculator, TermMatchData, TermMeta},
    DocId, Result, INVALID_DOCID,
};

use super::SegmentMultiPosting;

#[derive(Debug, PartialEq, Eq)]
struct PostingPick {
    current_docid: DocId,
    posting_index: usize,
}

impl PartialOrd for PostingPick {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PostingPick {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .current_docid
            .cmp(&self.current_docid)
            .then_with(|| other.posting_index.cmp(&self.posting_index))
    }
}

/// Union of the postings of many keys, such as the values of a range,
/// walked one segment at a time.
///
/// Within a segment the keys' postings are merged through a min-heap; a doc
/// matched by several keys is returned once.
pub struct RangePostingIterator<'a> {
    segments: Rc<[SegmentMultiPosting<'a>]>,
    term_meta: TermMeta,
    cursor: usize,
    segment_opened: bool,
    iterators: Vec<BufferedPostingIterator<'a>>,
    pick_heap: BinaryHeap<PostingPick>,
    current_docid: DocId,
    exhausted: bool,
}

impl<'a> RangePostingIterator<'a> {
    /// Returns `None` when no segment has any posting.
    pub fn new(segments: Vec<SegmentMultiPosting<'a>>) -> Result<Option<Self>> {
        let segments: Vec<_> = segments
            .into_iter()
            .filter(|segment| segment.posting_count() > 0)
            .collect();
        if segments.is_empty() {
            return Ok(None);
        }
        let mut calculator = MultiSegmentTermMetaCalculator::default();
        for segment in &segments {
            for posting in segment.postings() {
                calculator.add_segment(&posting.main_chain_term_meta()?);
            }
        }
        Ok(Some(Self::with_segments(
            segments.into(),
            calculator.term_meta(),
        )))
    }

    fn with_segments(segments: Rc<[SegmentMultiPosting<'a>]>, term_meta: TermMeta) -> Self {
        Self {
            segments,
            term_meta,
            cursor: 0,
            segment_opened: false,
            iterators: vec![],
            pick_heap: BinaryHeap::new(),
            current_docid: INVALID_DOCID,
            exhausted: false,
        }
    }

    /// Moves the cursor to the first segment, from the cursor on, whose doc
    /// range may hold `docid`.
    fn locate_segment(&self, cursor: usize, docid: DocId) -> usize {
        let mut cursor = cursor;
        while cursor + 1 < self.segments.len() && docid >= self.segments[cursor + 1].base_docid()
        {
            cursor += 1;
        }
        cursor
    }

    fn open_segment(&mut self, docid: DocId) -> Result<()> {
        self.iterators.clear();
        self.pick_heap.clear();
        let segment = &self.segments[self.cursor];
        for posting in segment.postings() {
            if let Some(iterator) = BufferedPostingIterator::with_options(
                vec![posting.clone()],
                None,
                DEFAULT_STATE_POOL_SIZE,
            )? {
                self.iterators.push(iterator);
            }
        }
        for (posting_index, iterator) in self.iterators.iter_mut().enumerate() {
            let current_docid = iterator.seek_doc(docid)?;
            if current_docid != INVALID_DOCID {
                self.pick_heap.push(PostingPick {
                    current_docid,
                    posting_index,
                });
            }
        }
        self.segment_opened = true;
        Ok(())
    }
}

impl<'a> PostingIterator<'a> for RangePostingIterator<'a> {
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(INVALID_DOCID);
        }
        let docid = std::cmp::max(docid, self.current_docid + 1);
        loop {
            if !self.segment_opened {
                if self.cursor >= self.segments.len() {
                    break;
                }
                self.cursor = self.locate_segment(self.cursor, docid);
                self.open_segment(docid)?;
            }
            while let Some(mut pick) = self.pick_heap.peek_mut() {
                if pick.current_docid >= docid {
                    break;
                }
                let next_docid = self.iterators[pick.posting_index].seek_doc(docid)?;
                if next_docid == INVALID_DOCID {
                    PeekMut::pop(pick);
                } else {
                    pick.current_docid = next_docid;
                }
            }
            if let Some(pick) = self.pick_heap.peek() {
                self.current_docid = pick.current_docid;
                return Ok(self.current_docid);
            }
            self.segment_opened = false;
            self.cursor += 1;
        }
        self.exhausted = true;
        self.current_docid = INVALID_DOCID;
        Ok(INVALID_DOCID)
    }

    fn unpack(&mut self, match_data: &mut TermMatchData<'a>) -> Result<()> {
        match_data.reset();
        if !self.exhausted && self.current_docid != INVALID_DOCID {
            match_data.matched = true;
            match_data.docid = self.current_docid;
            match_data.tf = 1;
        }
        Ok(())
    }

    fn term_meta(&self) -> &TermMeta {
        &self.term_meta
    }

    fn truncate_term_meta(&self) -> &TermMeta {
        &self.term_meta
    }

    fn iterator_type(&self) -> PostingIteratorType {
        PostingIteratorType::Range
    }

    fn clone_boxed(&self) -> Box<dyn PostingIterator<'a> + 'a> {
        Box::new(Self::with_segments(self.segments.clone(), self.term_meta))
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.segment_opened = false;
        self.iterators.clear();
        self.pick_heap.clear();
        self.current_docid = INVALID_DOCID;
        self.exhausted = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        index::{range::SegmentMultiPosting, PostingIterator, SegmentPosting},
        postings::{PostingFormatOption, PostingWriter, TermMeta},
        DocId, Result, INVALID_DOCID,
    };

    use super::RangePostingIterator;

    fn writer(docids: &[DocId]) -> PostingWriter {
        let mut writer = PostingWriter::new(PostingFormatOption::default());
        for &docid in docids {
            writer.end_doc(docid, 0);
        }
        writer
    }

    #[test]
    fn test_merge_and_dedup() -> Result<()> {
        let seg0 = [writer(&[1, 4, 8]), writer(&[2, 4, 9])];
        let seg1 = [writer(&[0, 3]), writer(&[3, 5])];
        let segments = vec![
            SegmentMultiPosting::new(
                0,
                10,
                seg0.iter()
                    .map(|w| SegmentPosting::new_realtime(0, 10, w))
                    .collect(),
            ),
            SegmentMultiPosting::new(
                10,
                10,
                seg1.iter()
                    .map(|w| SegmentPosting::new_realtime(10, 10, w))
                    .collect(),
            ),
        ];
        let mut iter = RangePostingIterator::new(segments)?.unwrap();
        assert_eq!(iter.term_meta(), &TermMeta::new(10, 10, 0));

        let mut docids = vec![];
        let mut docid = 0;
        loop {
            docid = iter.seek_doc(docid)?;
            if docid == INVALID_DOCID {
                break;
            }
            docids.push(docid);
        }
        assert_eq!(docids, vec![1, 2, 4, 8, 9, 10, 13, 15]);
        assert_eq!(iter.seek_doc(0)?, INVALID_DOCID);

        let mut cloned = iter.clone_boxed();
        assert_eq!(cloned.seek_doc(5)?, 8);
        assert_eq!(cloned.seek_doc(11)?, 13);
        assert_eq!(cloned.seek_doc(14)?, 15);
        Ok(())
    }
}
