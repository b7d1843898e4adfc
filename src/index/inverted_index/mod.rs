mod buffered_posting_decoder;
mod buffered_posting_iterator;
mod buffered_segment_decoder;
mod building_index_reader;
mod inverted_index_building_segment_reader;
mod inverted_index_persistent_segment_reader;
mod key_iterator;
mod multi_sharding_index_reader;
mod normal_index_reader;
mod segment_posting;
mod token_hasher;

pub use buffered_posting_decoder::BufferedPostingDecoder;
pub use buffered_posting_iterator::BufferedPostingIterator;
pub use building_index_reader::BuildingIndexReader;
pub use inverted_index_building_segment_reader::InvertedIndexBuildingSegmentReader;
pub use inverted_index_persistent_segment_reader::InvertedIndexPersistentSegmentReader;
pub use key_iterator::{KeyIterator, KeyLookup};
pub use multi_sharding_index_reader::{shard_index, MultiShardingIndexReader};
pub use normal_index_reader::NormalIndexReader;
pub use segment_posting::{SegmentPosting, SegmentPostingData};
pub use token_hasher::TokenHasher;
