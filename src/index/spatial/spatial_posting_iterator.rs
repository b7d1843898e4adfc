use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    index::{PostingIterator, PostingIteratorType},
    postings::{MultiSegmentTermMetaCalculator, TermMatchData, TermMeta},
    DocId, Result, INVALID_DOCID,
};

/// Union of the postings of the cells covering a shape.
///
/// Cells are independent terms, so a doc indexed under several of them is
/// produced once per cell when the caller seeks to the doc it was just
/// given. Term metas are summed over cells and overcount such docs.
pub struct SpatialPostingIterator<'a> {
    iterators: Vec<Box<dyn PostingIterator<'a> + 'a>>,
    term_meta: TermMeta,
    truncate_term_meta: TermMeta,
    heap: BinaryHeap<Reverse<(DocId, usize)>>,
    started: bool,
    // Sub-iterator of the doc returned last.
    current: Option<usize>,
    exhausted: bool,
}

impl<'a> SpatialPostingIterator<'a> {
    /// Returns `None` without any cell posting.
    pub fn new(iterators: Vec<Box<dyn PostingIterator<'a> + 'a>>) -> Option<Self> {
        if iterators.is_empty() {
            return None;
        }
        let mut main_chain = MultiSegmentTermMetaCalculator::default();
        let mut current_chain = MultiSegmentTermMetaCalculator::default();
        for iterator in &iterators {
            main_chain.add_segment(iterator.term_meta());
            current_chain.add_segment(iterator.truncate_term_meta());
        }
        Some(Self {
            heap: BinaryHeap::with_capacity(iterators.len()),
            iterators,
            term_meta: main_chain.term_meta(),
            truncate_term_meta: current_chain.term_meta(),
            started: false,
            current: None,
            exhausted: false,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.iterators.len()
    }

    fn push(&mut self, index: usize, docid: DocId) -> Result<()> {
        let docid = self.iterators[index].seek_doc(docid)?;
        if docid != INVALID_DOCID {
            self.heap.push(Reverse((docid, index)));
        }
        Ok(())
    }
}

impl<'a> PostingIterator<'a> for SpatialPostingIterator<'a> {
    fn seek_doc(&mut self, docid: DocId) -> Result<DocId> {
        if self.exhausted {
            return Ok(INVALID_DOCID);
        }
        if !self.started {
            self.started = true;
            for index in 0..self.iterators.len() {
                self.push(index, docid)?;
            }
        } else if let Some(index) = self.current.take() {
            // The doc returned last is consumed, move its cell past it.
            if let Some(Reverse((current_docid, top))) = self.heap.pop() {
                debug_assert_eq!(top, index);
                self.push(index, std::cmp::max(docid, current_docid + 1))?;
            }
        }

        while let Some(&Reverse((top_docid, index))) = self.heap.peek() {
            if top_docid >= docid {
                self.current = Some(index);
                return Ok(top_docid);
            }
            self.heap.pop();
            self.push(index, docid)?;
        }
        self.exhausted = true;
        Ok(INVALID_DOCID)
    }

    fn unpack(&mut self, match_data: &mut TermMatchData<'a>) -> Result<()> {
        match self.current {
            Some(index) if !self.exhausted => self.iterators[index].unpack(match_data),
            _ => {
                match_data.reset();
                Ok(())
            }
        }
    }

    fn term_meta(&self) -> &TermMeta {
        &self.term_meta
    }

    fn truncate_term_meta(&self) -> &TermMeta {
        &self.truncate_term_meta
    }

    fn iterator_type(&self) -> PostingIteratorType {
        PostingIteratorType::Spatial
    }

    fn clone_boxed(&self) -> Box<dyn PostingIterator<'a> + 'a> {
        Box::new(Self {
            iterators: self
                .iterators
                .iter()
                .map(|iterator| iterator.clone_boxed())
                .collect(),
            term_meta: self.term_meta,
            truncate_term_meta: self.truncate_term_meta,
            heap: BinaryHeap::with_capacity(self.iterators.len()),
            started: false,
            current: None,
            exhausted: false,
        })
    }

    fn reset(&mut self) {
        for iterator in &mut self.iterators {
            iterator.reset();
        }
        self.heap.clear();
        self.started = false;
        self.current = None;
        self.exhausted = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        index::{inverted_index::BufferedPostingIterator, PostingIterator, SegmentPosting},
        postings::{PostingFormatOption, PostingWriter, TermMatchData, TermMeta},
        DocId, Result, INVALID_DOCID,
    };

    use super::SpatialPostingIterator;

    fn writer(docids: &[DocId]) -> PostingWriter {
        let option = PostingFormatOption::builder().with_tflist().build();
        let mut writer = PostingWriter::new(option);
        for &docid in docids {
            writer.add_pos(0, 0);
            writer.end_doc(docid, 0);
        }
        writer
    }

    fn spatial<'a>(writers: &'a [PostingWriter]) -> Result<SpatialPostingIterator<'a>> {
        let mut iterators: Vec<Box<dyn PostingIterator<'a> + 'a>> = vec![];
        for writer in writers {
            let postings = vec![SegmentPosting::new_realtime(0, 100, writer)];
            iterators.push(Box::new(BufferedPostingIterator::new(postings)?.unwrap()));
        }
        Ok(SpatialPostingIterator::new(iterators).unwrap())
    }

    #[test]
    fn test_merge_keeps_duplicates() -> Result<()> {
        let writers = [writer(&[1, 4, 7]), writer(&[2, 4, 9])];
        let mut iter = spatial(&writers)?;
        assert_eq!(iter.term_meta(), &TermMeta::new(6, 6, 0));

        let mut docids = vec![];
        let mut docid = 0;
        loop {
            docid = iter.seek_doc(docid)?;
            if docid == INVALID_DOCID {
                break;
            }
            docids.push(docid);
        }
        assert_eq!(docids, vec![1, 2, 4, 4, 7, 9]);
        assert_eq!(iter.seek_doc(0)?, INVALID_DOCID);

        iter.reset();
        let mut docids = vec![];
        let mut docid = 0;
        loop {
            docid = iter.seek_doc(docid)?;
            if docid == INVALID_DOCID {
                break;
            }
            docids.push(docid);
            docid += 1;
        }
        assert_eq!(docids, vec![1, 2, 4, 7, 9]);
        Ok(())
    }

    #[test]
    fn test_unpack_and_clone() -> Result<()> {
        let writers = [writer(&[3, 50]), writer(&[10])];
        let mut iter = spatial(&writers)?;
        assert_eq!(iter.seek_doc(5)?, 10);
        let mut match_data = TermMatchData::default();
        iter.unpack(&mut match_data)?;
        assert_eq!(match_data.docid, 10);
        assert_eq!(match_data.tf, 1);

        let mut cloned = iter.clone_boxed();
        assert_eq!(cloned.seek_doc(0)?, 3);
        assert_eq!(iter.seek_doc(11)?, 50);
        assert_eq!(cloned.seek_doc(4)?, 10);
        Ok(())
    }
}
