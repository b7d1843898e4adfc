pub mod config;
pub mod error;
pub mod index;
pub mod postings;
pub mod query;
pub mod store;
pub mod util;

pub use error::{KensakuError, Result};

pub type DocId = i32;
pub type DocFreq = i32;
pub type TermFreq = u32;
pub type TotalTermFreq = i64;
pub type TermPayload = u32;
pub type DocPayload = u16;
pub type FieldMap = u8;
pub type Pos = u32;
pub type DictKey = u64;

/// Number of documents decoded into the iterator buffers at a time.
pub const MAX_DOC_PER_RECORD: usize = 128;
/// Number of positions covered by one position skip list entry.
pub const POSITION_SKIP_INTERVAL: usize = 128;

pub const INVALID_DOCID: DocId = -1;
pub const INVALID_POSITION: Pos = Pos::MAX;
