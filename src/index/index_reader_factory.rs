use std::sync::Arc;

use crate::{
    config::{IndexConfig, IndexReaderOptions, IndexType},
    Result,
};

use super::{
    inverted_index::{MultiShardingIndexReader, NormalIndexReader},
    range::RangeIndexReader,
    spatial::SpatialIndexReader,
    IndexReader, SegmentDataProvider,
};

#[derive(Default)]
pub struct IndexReaderFactory {}

impl IndexReaderFactory {
    pub fn create(
        &self,
        config: &IndexConfig,
        segments: &[Arc<dyn SegmentDataProvider>],
        options: &IndexReaderOptions,
    ) -> Result<Arc<dyn IndexReader>> {
        config.validate()?;
        if config.sharding.is_none() {
            return self.create_single(config, segments, options);
        }
        let shard_readers = (0..config.shard_count())
            .map(|shard| self.create_single(&config.shard_config(shard), segments, options))
            .collect::<Result<Vec<_>>>()?;
        Ok(Arc::new(MultiShardingIndexReader::open(
            config.clone(),
            shard_readers,
        )?))
    }

    fn create_single(
        &self,
        config: &IndexConfig,
        segments: &[Arc<dyn SegmentDataProvider>],
        options: &IndexReaderOptions,
    ) -> Result<Arc<dyn IndexReader>> {
        let reader = NormalIndexReader::open(config.clone(), segments, options.clone())?;
        let reader: Arc<dyn IndexReader> = match config.index_type {
            IndexType::Text => Arc::new(reader),
            IndexType::Range | IndexType::Date => Arc::new(RangeIndexReader::new(reader)),
            IndexType::Spatial => Arc::new(SpatialIndexReader::new(reader)),
        };
        Ok(reader)
    }
}
