use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    config::IndexConfig,
    postings::{
        compose_dict_value, BitmapPosting, CompressMode, DictInlineFormatter, DictInlinePosting,
        PostingDumper, PostingFormatOption, PostingWriter, TermMeta,
    },
    store::{DictionaryReader, FileReader, MemFile, SortedDictionary},
    DictKey, DocId, Result,
};

use super::{BuildingIndexSegmentReader, PostingChain, SegmentDataProvider};

type ChainId = (String, PostingChain);

struct ChainData {
    dictionary: Arc<SortedDictionary>,
    posting_file: Arc<MemFile>,
}

/// A segment whose dictionaries and posting files live in memory.
pub struct InMemorySegmentData {
    base_docid: DocId,
    doc_count: usize,
    is_building: bool,
    chains: AHashMap<ChainId, ChainData>,
    building_indexes: AHashMap<String, Arc<dyn BuildingIndexSegmentReader>>,
}

impl InMemorySegmentData {
    pub fn builder(base_docid: DocId, doc_count: usize) -> InMemorySegmentDataBuilder {
        InMemorySegmentDataBuilder::new(base_docid, doc_count)
    }

    fn chain(&self, index_name: &str, chain: &PostingChain) -> Option<&ChainData> {
        self.chains.get(&(index_name.to_string(), chain.clone()))
    }
}

impl SegmentDataProvider for InMemorySegmentData {
    fn base_docid(&self) -> DocId {
        self.base_docid
    }

    fn doc_count(&self) -> usize {
        self.doc_count
    }

    fn is_building(&self) -> bool {
        self.is_building
    }

    fn open_dictionary(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn DictionaryReader>>> {
        Ok(self
            .chain(index_name, chain)
            .map(|data| data.dictionary.clone() as Arc<dyn DictionaryReader>))
    }

    fn open_posting_file(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn FileReader>>> {
        Ok(self
            .chain(index_name, chain)
            .map(|data| data.posting_file.clone() as Arc<dyn FileReader>))
    }

    fn building_index(&self, index_name: &str) -> Option<Arc<dyn BuildingIndexSegmentReader>> {
        self.building_indexes.get(index_name).cloned()
    }
}

#[derive(Default)]
struct ChainBuilder {
    entries: Vec<(DictKey, u64)>,
    data: Vec<u8>,
}

/// Lays out the chains of a segment the way a dumped segment stores them:
/// one dictionary and one posting file per index and chain.
pub struct InMemorySegmentDataBuilder {
    base_docid: DocId,
    doc_count: usize,
    chains: AHashMap<ChainId, ChainBuilder>,
    building_indexes: AHashMap<String, Arc<dyn BuildingIndexSegmentReader>>,
}

impl InMemorySegmentDataBuilder {
    pub fn new(base_docid: DocId, doc_count: usize) -> Self {
        Self {
            base_docid,
            doc_count,
            chains: AHashMap::new(),
            building_indexes: AHashMap::new(),
        }
    }

    fn chain_builder(&mut self, index_name: &str, chain: PostingChain) -> &mut ChainBuilder {
        self.chains
            .entry((index_name.to_string(), chain))
            .or_default()
    }

    /// Adds the posting of `key` in the format of `config`. Small postings
    /// go into the dictionary value when the format allows it.
    pub fn add_posting(
        &mut self,
        config: &IndexConfig,
        chain: PostingChain,
        key: DictKey,
        posting: &PostingWriter,
    ) -> Result<&mut Self> {
        let option = config.posting_format_option();
        if config.posting_format.dict_inline {
            let inline_value = Self::inline_posting(option, posting)
                .and_then(|inline_posting| DictInlineFormatter::new(option).try_encode(&inline_posting));
            if let Some(inline_value) = inline_value {
                let dict_value = compose_dict_value(CompressMode::DICT_INLINE, inline_value);
                self.chain_builder(&config.index_name, chain)
                    .entries
                    .push((key, dict_value));
                return Ok(self);
            }
        }
        self.add_posting_with_option(&config.index_name, chain, key, posting, option)
    }

    /// Dumps the posting of `key` with `option`, whose reference bit picks
    /// the record layout.
    pub fn add_posting_with_option(
        &mut self,
        index_name: &str,
        chain: PostingChain,
        key: DictKey,
        posting: &PostingWriter,
        option: PostingFormatOption,
    ) -> Result<&mut Self> {
        let dumper = PostingDumper::new(option);
        let chain_builder = self.chain_builder(index_name, chain);
        let offset = chain_builder.data.len() as u64;
        dumper.dump(posting, &mut chain_builder.data)?;
        chain_builder
            .entries
            .push((key, compose_dict_value(dumper.compress_mode(), offset)));
        Ok(self)
    }

    /// Adds the bitmap of a high-frequency term, `docids` local and
    /// ascending.
    pub fn add_bitmap(
        &mut self,
        index_name: &str,
        key: DictKey,
        docids: &[DocId],
        term_meta: &TermMeta,
    ) -> Result<&mut Self> {
        let chain_builder = self.chain_builder(index_name, PostingChain::Bitmap);
        let offset = chain_builder.data.len() as u64;
        BitmapPosting::dump(docids, term_meta, &mut chain_builder.data)?;
        chain_builder
            .entries
            .push((key, compose_dict_value(CompressMode::NORMAL, offset)));
        Ok(self)
    }

    /// Marks the segment as building and attaches the live postings of one
    /// index.
    pub fn add_building_index(
        &mut self,
        index_name: &str,
        reader: Arc<dyn BuildingIndexSegmentReader>,
    ) -> &mut Self {
        self.building_indexes.insert(index_name.to_string(), reader);
        self
    }

    pub fn build(&mut self) -> InMemorySegmentData {
        let chains = std::mem::take(&mut self.chains)
            .into_iter()
            .map(|(chain_id, chain_builder)| {
                let data = ChainData {
                    dictionary: Arc::new(SortedDictionary::new(chain_builder.entries)),
                    posting_file: Arc::new(MemFile::new(chain_builder.data)),
                };
                (chain_id, data)
            })
            .collect();
        let building_indexes = std::mem::take(&mut self.building_indexes);
        InMemorySegmentData {
            base_docid: self.base_docid,
            doc_count: self.doc_count,
            is_building: !building_indexes.is_empty(),
            chains,
            building_indexes,
        }
    }

    /// A run of consecutive docs sharing every per-doc value.
    fn inline_posting(
        option: PostingFormatOption,
        posting: &PostingWriter,
    ) -> Option<DictInlinePosting> {
        let docids = posting.docids();
        let &first_docid = docids.first()?;
        let consecutive = docids
            .iter()
            .enumerate()
            .all(|(i, &docid)| docid == first_docid + i as DocId);
        if !consecutive {
            return None;
        }
        if option.has_tflist() && !posting.term_freqs().windows(2).all(|p| p[0] == p[1]) {
            return None;
        }
        if option.has_doc_payload() && !posting.doc_payloads().windows(2).all(|p| p[0] == p[1]) {
            return None;
        }
        if option.has_fieldmap() && !posting.field_maps().windows(2).all(|p| p[0] == p[1]) {
            return None;
        }
        Some(DictInlinePosting {
            term_payload: posting.term_meta().payload,
            docid: first_docid,
            doc_payload: if option.has_doc_payload() {
                posting.doc_payloads()[0]
            } else {
                0
            },
            term_freq: if option.has_tflist() {
                posting.term_freqs()[0]
            } else {
                1
            },
            field_map: if option.has_fieldmap() {
                posting.field_maps()[0]
            } else {
                0
            },
            doc_freq: posting.doc_freq(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::IndexConfig,
        index::{
            inverted_index::InvertedIndexBuildingSegmentReader, PostingChain, SegmentDataProvider,
        },
        postings::{split_dict_value, PostingWriter},
        Result,
    };

    use super::InMemorySegmentData;

    #[test]
    fn test_build_chains() -> Result<()> {
        let mut config = IndexConfig::new("title");
        config.posting_format.term_frequency = true;
        config.posting_format.dict_inline = true;
        let option = config.posting_format_option();

        let mut run = PostingWriter::new(option);
        for docid in 3..6 {
            run.end_doc(docid, 0);
        }
        let mut sparse = PostingWriter::new(option);
        sparse.end_doc(1, 0);
        sparse.end_doc(7, 0);

        let segment = InMemorySegmentData::builder(0, 10)
            .add_posting(&config, PostingChain::Main, 1, &run)?
            .add_posting(&config, PostingChain::Main, 2, &sparse)?
            .build();
        assert!(!segment.is_building());

        let dictionary = segment.open_dictionary("title", &PostingChain::Main)?.unwrap();
        let (mode, _) = split_dict_value(dictionary.lookup(1)?.unwrap())?;
        assert!(mode.is_dict_inline());
        let (mode, offset) = split_dict_value(dictionary.lookup(2)?.unwrap())?;
        assert!(!mode.is_dict_inline());
        assert_eq!(offset, 0);
        assert!(segment.open_dictionary("title", &PostingChain::Bitmap)?.is_none());
        assert!(segment.open_posting_file("body", &PostingChain::Main)?.is_none());
        Ok(())
    }

    #[test]
    fn test_building_segment() {
        let reader = InvertedIndexBuildingSegmentReader::new(Default::default());
        let segment = InMemorySegmentData::builder(20, 5)
            .add_building_index("title", Arc::new(reader))
            .build();
        assert!(segment.is_building());
        assert!(segment.building_index("title").is_some());
        assert!(segment.building_index("body").is_none());
    }
}
