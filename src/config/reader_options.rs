use std::sync::Arc;

use rayon::ThreadPool;

use crate::postings::SectionAttributeReader;

pub const DEFAULT_STATE_POOL_SIZE: usize = 1000;

/// Runtime resources handed to index readers.
#[derive(Clone)]
pub struct IndexReaderOptions {
    /// Upper bound of in-doc position states a posting iterator hands out at
    /// once.
    pub state_pool_size: usize,
    /// Pool running per-segment lookups. Without one, lookups run serially
    /// on the calling thread.
    pub executor: Option<Arc<ThreadPool>>,
    pub section_reader: Option<Arc<dyn SectionAttributeReader>>,
}

impl Default for IndexReaderOptions {
    fn default() -> Self {
        Self {
            state_pool_size: DEFAULT_STATE_POOL_SIZE,
            executor: None,
            section_reader: None,
        }
    }
}

impl IndexReaderOptions {
    pub fn with_executor(mut self, executor: Arc<ThreadPool>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_state_pool_size(mut self, state_pool_size: usize) -> Self {
        self.state_pool_size = state_pool_size;
        self
    }

    pub fn with_section_reader(mut self, section_reader: Arc<dyn SectionAttributeReader>) -> Self {
        self.section_reader = Some(section_reader);
        self
    }
}
