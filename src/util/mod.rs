mod immutable_bitset;
mod object_pool;

pub use immutable_bitset::ImmutableBitset;
pub use object_pool::{ObjectPool, Pooled};
