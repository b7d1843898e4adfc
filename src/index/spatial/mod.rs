mod spatial_index_reader;
mod spatial_posting_iterator;

pub use spatial_index_reader::SpatialIndexReader;
pub use spatial_posting_iterator::SpatialPostingIterator;
