pub mod bitset;
mod in_memory_segment_data;
mod index_reader;
mod index_reader_factory;
mod index_segment_data;
pub mod inverted_index;
mod multi_segment_iterator;
mod posting_iterator;
pub mod range;
pub mod spatial;

pub use in_memory_segment_data::{InMemorySegmentData, InMemorySegmentDataBuilder};
pub use index_reader::IndexReader;
pub use index_reader_factory::IndexReaderFactory;
pub use index_segment_data::{BuildingIndexSegmentReader, PostingChain, SegmentDataProvider};
pub use inverted_index::{SegmentPosting, SegmentPostingData};
pub use multi_segment_iterator::{MultiSegmentIterator, SingleIterator};
pub use posting_iterator::{PostingIterator, PostingIteratorBase, PostingIteratorType, PostingType};
