mod range_index_reader;
mod range_posting_iterator;
mod range_query_encoder;
mod segment_multi_posting;

pub use range_index_reader::{RangeIndexReader, MAX_RANGE_KEYS};
pub use range_posting_iterator::RangePostingIterator;
pub use range_query_encoder::RangeQueryEncoder;
pub use segment_multi_posting::SegmentMultiPosting;
