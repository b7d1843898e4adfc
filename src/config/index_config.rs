use serde::{Deserialize, Serialize};

use crate::{postings::PostingFormatOption, KensakuError, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    #[default]
    Text,
    Range,
    Date,
    Spatial,
}

/// Sections carried by the postings of an index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingFormatConfig {
    pub term_frequency: bool,
    pub doc_payload: bool,
    pub field_map: bool,
    pub position_list: bool,
    pub term_payload: bool,
    pub reference_compress: bool,
    pub compressed_header: bool,
    /// Small postings may be stored in their dictionary value.
    pub dict_inline: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighFrequencyTermPostingType {
    /// High-frequency terms only have a bitmap chain.
    #[default]
    Bitmap,
    /// High-frequency terms have both a bitmap and a normal chain.
    Both,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighFrequencyConfig {
    pub vocabulary: Vec<String>,
    pub posting_type: HighFrequencyTermPostingType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingConfig {
    pub shard_count: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub index_name: String,
    #[serde(default)]
    pub index_type: IndexType,
    #[serde(default)]
    pub posting_format: PostingFormatConfig,
    #[serde(default)]
    pub truncate_profiles: Vec<String>,
    #[serde(default)]
    pub high_frequency: Option<HighFrequencyConfig>,
    #[serde(default)]
    pub sharding: Option<ShardingConfig>,
    #[serde(default)]
    pub has_section_attribute: bool,
}

impl PostingFormatConfig {
    pub fn posting_format_option(&self) -> PostingFormatOption {
        let mut builder = PostingFormatOption::builder();
        if self.term_frequency {
            builder = builder.with_tflist();
        }
        if self.doc_payload {
            builder = builder.with_doc_payload();
        }
        if self.field_map {
            builder = builder.with_fieldmap();
        }
        if self.position_list {
            builder = builder.with_position_list();
        }
        if self.term_payload {
            builder = builder.with_term_payload();
        }
        if self.reference_compress {
            builder = builder.with_reference_compress();
        }
        if self.compressed_header {
            builder = builder.with_compressed_header();
        }
        builder.build()
    }
}

impl IndexConfig {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_name.is_empty() {
            return Err(KensakuError::InvalidArgument(
                "index name is empty".to_string(),
            ));
        }
        if let Some(sharding) = &self.sharding {
            if sharding.shard_count == 0 {
                return Err(KensakuError::InconsistentConfig(format!(
                    "index `{}` has zero shards",
                    self.index_name
                )));
            }
        }
        Ok(())
    }

    pub fn posting_format_option(&self) -> PostingFormatOption {
        self.posting_format.posting_format_option()
    }

    pub fn high_frequency_posting_type(&self) -> Option<HighFrequencyTermPostingType> {
        self.high_frequency.as_ref().map(|hf| hf.posting_type)
    }

    pub fn shard_count(&self) -> usize {
        self.sharding.map_or(1, |sharding| sharding.shard_count)
    }

    pub fn shard_name(&self, shard: usize) -> String {
        format!("{}_@_{}", self.index_name, shard)
    }

    /// The config of one shard of a sharded index: same format, its own
    /// name, no sharding.
    pub fn shard_config(&self, shard: usize) -> Self {
        Self {
            index_name: self.shard_name(shard),
            sharding: None,
            ..self.clone()
        }
    }
}
