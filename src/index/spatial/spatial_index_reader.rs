use crate::{
    config::IndexConfig,
    index::{inverted_index::NormalIndexReader, IndexReader, PostingIterator, PostingType},
    query::Term,
    Result,
};

use super::SpatialPostingIterator;

/// Spatial indexes: a location is indexed under the cells covering it, and a
/// spatial term lists the cells of the searched area.
pub struct SpatialIndexReader {
    reader: NormalIndexReader,
}

impl SpatialIndexReader {
    pub fn new(reader: NormalIndexReader) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &NormalIndexReader {
        &self.reader
    }

    /// Merges the postings of `cells`. Cells without postings are skipped.
    pub fn lookup_cells<'a>(
        &'a self,
        cells: &[&str],
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let token_hasher = self.reader.token_hasher();
        let mut iterators = Vec::with_capacity(cells.len());
        for cell in cells {
            if let Some(iterator) = self.reader.lookup_key(token_hasher.hash_word(cell))? {
                iterators.push(iterator);
            }
        }
        Ok(SpatialPostingIterator::new(iterators)
            .map(|iterator| Box::new(iterator) as Box<dyn PostingIterator<'a> + 'a>))
    }
}

impl IndexReader for SpatialIndexReader {
    fn lookup<'a>(
        &'a self,
        term: &Term,
        _posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let cells: Vec<_> = term
            .word()
            .split(',')
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        self.lookup_cells(&cells)
    }

    fn index_config(&self) -> &IndexConfig {
        self.reader.config()
    }
}
