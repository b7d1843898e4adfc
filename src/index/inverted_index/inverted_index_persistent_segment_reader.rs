use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    config::IndexConfig,
    index::{PostingChain, SegmentDataProvider, SegmentPosting},
    postings::{split_dict_value, ByteSliceList, PostingFormatOption},
    store::{DictionaryReader, FileReader},
    DictKey, DocId, Result,
};

struct ChainReader {
    dictionary: Arc<dyn DictionaryReader>,
    posting_file: Arc<dyn FileReader>,
}

/// Dictionaries and posting files of one index in one built segment.
pub struct InvertedIndexPersistentSegmentReader {
    base_docid: DocId,
    doc_count: usize,
    option: PostingFormatOption,
    main: Option<ChainReader>,
    truncates: AHashMap<String, ChainReader>,
    bitmap: Option<ChainReader>,
}

impl InvertedIndexPersistentSegmentReader {
    pub fn open(config: &IndexConfig, segment: &dyn SegmentDataProvider) -> Result<Self> {
        let index_name = config.index_name.as_str();
        let main = Self::open_chain(segment, index_name, &PostingChain::Main)?;
        let mut truncates = AHashMap::new();
        for profile in &config.truncate_profiles {
            let chain = PostingChain::Truncate(profile.clone());
            if let Some(chain_reader) = Self::open_chain(segment, index_name, &chain)? {
                truncates.insert(profile.clone(), chain_reader);
            }
        }
        let bitmap = if config.high_frequency.is_some() {
            Self::open_chain(segment, index_name, &PostingChain::Bitmap)?
        } else {
            None
        };

        Ok(Self {
            base_docid: segment.base_docid(),
            doc_count: segment.doc_count(),
            option: config.posting_format_option(),
            main,
            truncates,
            bitmap,
        })
    }

    fn open_chain(
        segment: &dyn SegmentDataProvider,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<ChainReader>> {
        let Some(dictionary) = segment.open_dictionary(index_name, chain)? else {
            return Ok(None);
        };
        let Some(posting_file) = segment.open_posting_file(index_name, chain)? else {
            return Ok(None);
        };
        Ok(Some(ChainReader {
            dictionary,
            posting_file,
        }))
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    fn chain_reader(&self, chain: &PostingChain) -> Option<&ChainReader> {
        match chain {
            PostingChain::Main => self.main.as_ref(),
            PostingChain::Truncate(profile) => self.truncates.get(profile),
            PostingChain::Bitmap => self.bitmap.as_ref(),
        }
    }

    /// Looks `key` up in one chain of the segment.
    pub fn segment_posting(
        &self,
        key: DictKey,
        chain: &PostingChain,
    ) -> Result<Option<SegmentPosting<'static>>> {
        let Some(chain_reader) = self.chain_reader(chain) else {
            return Ok(None);
        };
        let Some(dict_value) = chain_reader.dictionary.lookup(key)? else {
            return Ok(None);
        };
        let (compress_mode, value) = split_dict_value(dict_value)?;
        let posting_file = chain_reader.posting_file.clone();

        if *chain == PostingChain::Bitmap {
            let posting = ByteSliceList::open_to_end(posting_file, value as usize);
            return Ok(Some(SegmentPosting::new_slice_list(
                self.base_docid,
                self.doc_count,
                posting,
                PostingFormatOption::default(),
            )));
        }
        if compress_mode.is_dict_inline() {
            return Ok(Some(SegmentPosting::new_dict_inline(
                self.base_docid,
                self.doc_count,
                value,
                self.option,
            )));
        }
        let posting = ByteSliceList::open_to_end(posting_file, value as usize);
        Ok(Some(SegmentPosting::new_with_compress_mode(
            self.base_docid,
            self.doc_count,
            compress_mode,
            posting,
            self.option,
        )))
    }

    /// Keys of the main chain, ascending.
    pub fn keys(&self) -> Vec<DictKey> {
        self.main
            .as_ref()
            .map(|chain_reader| chain_reader.dictionary.iter().map(|(key, _)| key).collect())
            .unwrap_or_default()
    }
}
