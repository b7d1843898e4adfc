use std::sync::Arc;

use ahash::AHashSet;
use log::{debug, error, info};

use crate::{
    config::{HighFrequencyTermPostingType, IndexConfig, IndexReaderOptions},
    index::{
        bitset::BitmapPostingIterator, IndexReader, PostingChain, PostingIterator, PostingType,
        SegmentDataProvider, SegmentPosting,
    },
    postings::SectionAttributeReader,
    query::Term,
    DictKey, KensakuError, Result,
};

use super::{
    BufferedPostingIterator, BuildingIndexReader, InvertedIndexPersistentSegmentReader,
    TokenHasher,
};

/// Term lookup over the built and building segments of one index.
///
/// Built segments are searched first, one dictionary lookup per segment,
/// then the building segments. The postings found are handed to a single
/// iterator in ascending base doc id order.
pub struct NormalIndexReader {
    config: IndexConfig,
    options: IndexReaderOptions,
    segment_readers: Vec<InvertedIndexPersistentSegmentReader>,
    building_reader: BuildingIndexReader,
    high_frequency_keys: AHashSet<DictKey>,
    token_hasher: TokenHasher,
}

impl NormalIndexReader {
    /// Opens every segment of the index. A segment that fails to open fails
    /// the whole reader.
    pub fn open(
        config: IndexConfig,
        segments: &[Arc<dyn SegmentDataProvider>],
        options: IndexReaderOptions,
    ) -> Result<Self> {
        config.validate()?;
        let index_name = config.index_name.clone();

        let mut segment_readers = Vec::new();
        let mut building_reader = BuildingIndexReader::new();
        let mut last_base_docid = None;
        for segment in segments {
            let base_docid = segment.base_docid();
            if last_base_docid.is_some_and(|last| base_docid < last) {
                return Err(KensakuError::InvalidArgument(format!(
                    "segments of index `{}` are not ordered by base docid, {} after {:?}",
                    index_name, base_docid, last_base_docid
                )));
            }
            last_base_docid = Some(base_docid);

            if segment.is_building() {
                building_reader.add_segment_reader(
                    base_docid,
                    segment.doc_count(),
                    segment.building_index(&index_name),
                );
                continue;
            }
            if !building_reader.is_empty() {
                return Err(KensakuError::InvalidArgument(format!(
                    "built segment at base docid {} of index `{}` follows a building segment",
                    base_docid, index_name
                )));
            }
            let segment_reader = InvertedIndexPersistentSegmentReader::open(&config, segment.as_ref())
                .map_err(|e| {
                    error!(
                        "open segment at base docid {} of index `{}` failed: {}",
                        base_docid, index_name, e
                    );
                    e
                })?;
            segment_readers.push(segment_reader);
        }

        let token_hasher = TokenHasher::default();
        let high_frequency_keys = config
            .high_frequency
            .as_ref()
            .map(|high_frequency| {
                high_frequency
                    .vocabulary
                    .iter()
                    .map(|word| token_hasher.hash_word(word))
                    .collect()
            })
            .unwrap_or_default();

        if options.executor.is_none() {
            info!("index `{}` has no executor, lookups run in serial mode", index_name);
        }

        Ok(Self {
            config,
            options,
            segment_readers,
            building_reader,
            high_frequency_keys,
            token_hasher,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn token_hasher(&self) -> &TokenHasher {
        &self.token_hasher
    }

    pub fn segment_count(&self) -> usize {
        self.segment_readers.len() + self.building_reader.segment_count()
    }

    /// A high-frequency term only stored as a bitmap.
    pub fn is_bitmap_only(&self, key: DictKey) -> bool {
        self.config.high_frequency_posting_type() == Some(HighFrequencyTermPostingType::Bitmap)
            && self.high_frequency_keys.contains(&key)
    }

    pub fn lookup_term<'a>(
        &'a self,
        term: &Term,
        posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let key = self.token_hasher.hash_word(term.word());
        if posting_type == PostingType::Bitmap {
            return self.lookup_bitmap(key);
        }

        let chain = match term.truncate_name() {
            Some(truncate_name) => {
                if !self.config.truncate_profiles.iter().any(|p| p == truncate_name) {
                    return Err(KensakuError::InvalidArgument(format!(
                        "index `{}` has no truncate profile `{}`",
                        self.config.index_name, truncate_name
                    )));
                }
                PostingChain::Truncate(truncate_name.to_string())
            }
            None => {
                if self.is_bitmap_only(key) {
                    debug!(
                        "term `{}` of index `{}` is bitmap only, not found in normal postings",
                        term.word(),
                        self.config.index_name
                    );
                    return Ok(None);
                }
                PostingChain::Main
            }
        };

        let segment_postings = self.segment_postings(key, &chain)?;
        debug!(
            "term `{}` of index `{}` found in {} segments",
            term.word(),
            self.config.index_name,
            segment_postings.len()
        );
        self.buffered_iterator(segment_postings)
    }

    /// The main chain posting iterator of a raw dictionary key.
    pub fn lookup_key<'a>(
        &'a self,
        key: DictKey,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let segment_postings = self.segment_postings(key, &PostingChain::Main)?;
        self.buffered_iterator(segment_postings)
    }

    fn lookup_bitmap<'a>(
        &'a self,
        key: DictKey,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        let segment_postings = self.segment_postings(key, &PostingChain::Bitmap)?;
        Ok(BitmapPostingIterator::new(segment_postings)?
            .map(|iterator| Box::new(iterator) as Box<dyn PostingIterator<'a> + 'a>))
    }

    fn buffered_iterator<'a>(
        &'a self,
        segment_postings: Vec<SegmentPosting<'a>>,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        Ok(BufferedPostingIterator::with_options(
            segment_postings,
            self.section_reader(),
            self.options.state_pool_size,
        )?
        .map(|iterator| Box::new(iterator) as Box<dyn PostingIterator<'a> + 'a>))
    }

    fn section_reader(&self) -> Option<Arc<dyn SectionAttributeReader>> {
        if self.config.has_section_attribute {
            self.options.section_reader.clone()
        } else {
            None
        }
    }

    /// Main chain postings of `key`, one per segment holding it.
    pub fn segment_postings_by_key(&self, key: DictKey) -> Result<Vec<SegmentPosting<'_>>> {
        self.segment_postings(key, &PostingChain::Main)
    }

    fn segment_postings(&self, key: DictKey, chain: &PostingChain) -> Result<Vec<SegmentPosting<'_>>> {
        let mut slots: Vec<Result<Option<SegmentPosting<'static>>>> =
            self.segment_readers.iter().map(|_| Ok(None)).collect();
        match &self.options.executor {
            Some(executor) => executor.scope(|scope| {
                for (slot, segment_reader) in slots.iter_mut().zip(&self.segment_readers) {
                    scope.spawn(move |_| {
                        *slot = self.lookup_segment(segment_reader, key, chain);
                    });
                }
            }),
            None => {
                for (slot, segment_reader) in slots.iter_mut().zip(&self.segment_readers) {
                    *slot = self.lookup_segment(segment_reader, key, chain);
                }
            }
        }

        let mut segment_postings =
            Vec::with_capacity(slots.len() + self.building_reader.segment_count());
        for slot in slots {
            if let Some(segment_posting) = slot? {
                segment_postings.push(segment_posting);
            }
        }
        // Building segments only carry main chains.
        if *chain != PostingChain::Bitmap {
            self.building_reader.segment_postings(key, &mut segment_postings);
        }
        Ok(segment_postings)
    }

    fn lookup_segment(
        &self,
        segment_reader: &InvertedIndexPersistentSegmentReader,
        key: DictKey,
        chain: &PostingChain,
    ) -> Result<Option<SegmentPosting<'static>>> {
        match chain {
            PostingChain::Truncate(_) => match segment_reader.segment_posting(key, chain)? {
                Some(mut segment_posting) => {
                    self.fill_truncate_segment_posting(segment_reader, key, &mut segment_posting)?;
                    Ok(Some(segment_posting))
                }
                None => segment_reader.segment_posting(key, &PostingChain::Main),
            },
            _ => segment_reader.segment_posting(key, chain),
        }
    }

    /// Gives a truncated posting the term meta of its full chain, the main
    /// one or else the bitmap one.
    fn fill_truncate_segment_posting(
        &self,
        segment_reader: &InvertedIndexPersistentSegmentReader,
        key: DictKey,
        segment_posting: &mut SegmentPosting<'static>,
    ) -> Result<()> {
        let main_posting = match segment_reader.segment_posting(key, &PostingChain::Main)? {
            Some(main_posting) => Some(main_posting),
            None => segment_reader.segment_posting(key, &PostingChain::Bitmap)?,
        };
        match main_posting {
            Some(main_posting) => {
                segment_posting.set_main_chain_term_meta(main_posting.current_term_meta()?);
            }
            None => {
                error!(
                    "truncate posting of key {} in segment at base docid {} of index `{}` has no main or bitmap chain",
                    key,
                    segment_reader.base_docid(),
                    self.config.index_name
                );
            }
        }
        Ok(())
    }

    /// Keys of the main chains of all segments, ascending and deduplicated.
    pub fn keys(&self) -> Vec<DictKey> {
        let mut keys: Vec<_> = self
            .segment_readers
            .iter()
            .flat_map(|segment_reader| segment_reader.keys())
            .chain(self.building_reader.keys())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

impl IndexReader for NormalIndexReader {
    fn lookup<'a>(
        &'a self,
        term: &Term,
        posting_type: PostingType,
    ) -> Result<Option<Box<dyn PostingIterator<'a> + 'a>>> {
        self.lookup_term(term, posting_type)
    }

    fn index_config(&self) -> &IndexConfig {
        &self.config
    }
}
