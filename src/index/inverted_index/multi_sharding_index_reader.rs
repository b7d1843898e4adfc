use std::sync::Arc;

use log::error;

use crate::{
    config::IndexConfig,
    index::{IndexReader, PostingIterator, PostingType},
    query::Term,
    DictKey, KensakuError, Result,
};

use super::{NormalIndexReader, TokenHasher};

/// The shard holding `key` among `shard_count` shards.
pub fn shard_index(key: DictKey, shard_count: usize) -> usize {
    (key % shard_count as u64) as usize
}

/// An index split by dictionary key over several normal index readers.
pub struct MultiShardingIndexReader {
    config: IndexConfig,
    shards: Vec<Arc<NormalIndexReader>>,
    token_hasher: TokenHasher,
}

impl MultiShardingIndexReader {
    /// Every shard reader must be a `NormalIndexReader`, one per configured
    /// shard in shard order.
    pub fn open(config: IndexConfig, shard_readers: Vec<Arc<dyn IndexReader>>) -> Result<Self> {
        if shard_readers.len() != config.shard_count() {
            error!(
                "index `{}` is configured with {} shards, got {} shard readers",
                config.index_name,
                config.shard_count(),
                shard_readers.len()
            );
            return Err(KensakuError::InconsistentConfig(format!(
                "index `{}` expects {} shard readers, got {}",
                config.index_name,
                config.shard_count(),
                shard_readers.len()
            )));
        }

        let mut shards = Vec::with_capacity(shard_readers.len());
        for (shard, shard_reader) in shard_readers.into_iter().enumerate() {
            let shard_name = shard_reader.index_config().index_name.clone();
            match shard_reader.downcast_arc::<NormalIndexReader>() {
                Ok(shard_reader) => shards.push(shard_reader),
                Err(_) => {
                    error!(
                        "shard {} (`{}`) of index `{}` is not a normal index reader",
                        shard, shard_name, config.index_name
                    );
                    return Err(KensakuError::InconsistentConfig(format!(
                        "shard `{}` of index `{}` has a mismatched index type",
                        shard_name, config.index_name
                    )));
                }
            }
        }

        Ok(Self {
            config,
            shards,
            token_hasher: TokenHasher::default(),
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard(&self, shard: usize) -> Option<&NormalIndexReader> {
        self.shards.get(shard).map(|shard_reader| shard_reader.as_ref())
    }

    /// The shard a word is stored in.
    pub fn shard_of(&self, word: &str) -> usize {
        shard_index(self.token_hasher.hash_word(word), self.shards.len())
    }
}

impl IndexReader for MultiShardingIndexReader {
    fn lookup<'a>(
        &'a self,
        term: &Term,
        posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        self.shards[self.shard_of(term.word())].lookup_term(term, posting_type)
    }

    fn index_config(&self) -> &IndexConfig {
        &self.config
    }
}
