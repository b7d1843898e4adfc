mod index_config;
mod reader_options;

pub use index_config::{
    HighFrequencyConfig, HighFrequencyTermPostingType, IndexConfig, IndexType,
    PostingFormatConfig, ShardingConfig,
};
pub use reader_options::{IndexReaderOptions, DEFAULT_STATE_POOL_SIZE};
