use downcast_rs::{impl_downcast, DowncastSync};

use crate::{config::IndexConfig, query::Term, Result};

use super::{PostingIterator, PostingType};

/// Term lookup over all segments of one index.
pub trait IndexReader: Send + Sync + DowncastSync {
    /// `Ok(None)` when no segment holds the term.
    fn lookup<'a>(
        &'a self,
        term: &Term,
        posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>>;

    fn index_config(&self) -> &IndexConfig;
}

impl_downcast!(sync IndexReader);
