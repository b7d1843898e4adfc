use std::{io, sync::Arc};

use kensaku::{
    config::{
        HighFrequencyConfig, HighFrequencyTermPostingType, IndexConfig, IndexReaderOptions,
        IndexType, ShardingConfig,
    },
    index::{
        inverted_index::{
            shard_index, InvertedIndexBuildingSegmentReader, KeyIterator,
            MultiShardingIndexReader, NormalIndexReader, TokenHasher,
        },
        BuildingIndexSegmentReader, InMemorySegmentData, IndexReader, IndexReaderFactory,
        PostingChain, PostingIterator, PostingType, SegmentDataProvider,
    },
    postings::{PostingWriter, TermMatchData, TermMeta},
    query::Term,
    store::{DictionaryReader, FileReader},
    DictKey, DocId, KensakuError, Result, INVALID_DOCID, INVALID_POSITION,
};

fn key(word: &str) -> DictKey {
    TokenHasher::default().hash_word(word)
}

fn term(index_name: &str, word: &str) -> Term {
    Term::new(index_name.to_string(), word.to_string())
}

/// `docs` are local `(docid, tf)` pairs; occurrences sit at positions
/// 0, 2, 4...
fn posting(config: &IndexConfig, docs: &[(DocId, u32)]) -> PostingWriter {
    let mut writer = PostingWriter::new(config.posting_format_option());
    for &(docid, tf) in docs {
        for i in 0..tf {
            writer.add_pos(i * 2, 0);
        }
        writer.end_doc(docid, 0);
    }
    writer
}

fn text_config(index_name: &str) -> IndexConfig {
    let mut config = IndexConfig::new(index_name);
    config.posting_format.term_frequency = true;
    config
}

fn get_all_docs<'a>(posting_iter: &mut (dyn PostingIterator<'a> + 'a)) -> Result<Vec<DocId>> {
    let mut docids = vec![];
    let mut docid = 0;
    loop {
        docid = posting_iter.seek_doc(docid)?;
        if docid == INVALID_DOCID {
            break;
        }
        docids.push(docid);
        docid += 1;
    }
    Ok(docids)
}

fn lookup_docs(
    index_reader: &dyn IndexReader,
    term: &Term,
    posting_type: PostingType,
) -> Result<Vec<DocId>> {
    match index_reader.lookup(term, posting_type)? {
        Some(mut posting_iter) => get_all_docs(posting_iter.as_mut()),
        None => Ok(vec![]),
    }
}

fn open(
    config: &IndexConfig,
    segments: Vec<Arc<dyn SegmentDataProvider>>,
) -> Result<Arc<dyn IndexReader>> {
    IndexReaderFactory::default().create(config, &segments, &IndexReaderOptions::default())
}

#[test]
fn test_lookup_built_and_building_segments() -> Result<()> {
    let mut config = text_config("title");
    config.posting_format.position_list = true;

    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_posting(
            &config,
            PostingChain::Main,
            key("hello"),
            &posting(&config, &[(2, 1), (5, 3), (9, 2)]),
        )?
        .build();
    let seg1 = InMemorySegmentData::builder(10, 5)
        .add_posting(
            &config,
            PostingChain::Main,
            key("hello"),
            &posting(&config, &[(1, 4), (3, 1)]),
        )?
        .build();
    let mut building = InvertedIndexBuildingSegmentReader::new(config.posting_format_option());
    for docid in [0, 2] {
        building.posting_writer(key("hello")).add_pos(0, 0);
        building.posting_writer(key("hello")).end_doc(docid, 0);
    }
    let seg2 = InMemorySegmentData::builder(15, 5)
        .add_building_index("title", Arc::new(building))
        .build();

    let index_reader = open(
        &config,
        vec![Arc::new(seg0), Arc::new(seg1), Arc::new(seg2)],
    )?;
    let mut posting_iter = index_reader
        .lookup(&term("title", "hello"), PostingType::Normal)?
        .unwrap();
    assert!(posting_iter.has_position());
    assert_eq!(posting_iter.term_meta(), &TermMeta::new(7, 13, 0));

    assert_eq!(posting_iter.seek_doc(0)?, 2);
    assert_eq!(posting_iter.seek_doc(3)?, 5);
    let mut match_data = TermMatchData::default();
    posting_iter.unpack(&mut match_data)?;
    assert_eq!(match_data.tf, 3);
    assert_eq!(posting_iter.seek_position(1)?, 2);
    assert_eq!(posting_iter.seek_position(3)?, 4);
    assert_eq!(posting_iter.seek_position(5)?, INVALID_POSITION);

    assert_eq!(posting_iter.seek_doc(6)?, 9);
    assert_eq!(posting_iter.seek_doc(10)?, 11);
    posting_iter.unpack(&mut match_data)?;
    assert_eq!(match_data.tf, 4);
    assert_eq!(posting_iter.seek_doc(12)?, 13);
    assert_eq!(posting_iter.seek_doc(14)?, 15);
    assert_eq!(posting_iter.seek_doc(16)?, 17);
    assert_eq!(posting_iter.seek_doc(18)?, INVALID_DOCID);
    assert_eq!(posting_iter.seek_doc(0)?, INVALID_DOCID);

    assert!(index_reader
        .lookup(&term("title", "missing"), PostingType::Normal)?
        .is_none());
    Ok(())
}

#[test]
fn test_executor_matches_serial_mode() -> Result<()> {
    let config = text_config("body");
    let mut segments: Vec<Arc<dyn SegmentDataProvider>> = vec![];
    let mut expect = vec![];
    for segment in 0..8 {
        let base_docid = segment * 100;
        let docs: Vec<_> = (0..100).filter(|d| (d + segment) % 7 == 0).collect();
        expect.extend(docs.iter().map(|d| base_docid + d));
        let docs: Vec<_> = docs.into_iter().map(|d| (d, 1)).collect();
        let data = InMemorySegmentData::builder(base_docid, 100)
            .add_posting(&config, PostingChain::Main, key("word"), &posting(&config, &docs))?
            .build();
        segments.push(Arc::new(data));
    }

    let executor = Arc::new(
        rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .unwrap(),
    );
    let parallel = IndexReaderFactory::default().create(
        &config,
        &segments,
        &IndexReaderOptions::default().with_executor(executor),
    )?;
    let serial = IndexReaderFactory::default().create(
        &config,
        &segments,
        &IndexReaderOptions::default(),
    )?;

    let word = term("body", "word");
    let parallel_docs = lookup_docs(parallel.as_ref(), &word, PostingType::Normal)?;
    assert_eq!(parallel_docs, expect);
    assert_eq!(
        lookup_docs(serial.as_ref(), &word, PostingType::Normal)?,
        parallel_docs
    );
    Ok(())
}

#[test]
fn test_truncate_chain() -> Result<()> {
    let mut config = text_config("title");
    config.truncate_profiles = vec!["top".to_string()];

    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_posting(
            &config,
            PostingChain::Main,
            key("rust"),
            &posting(&config, &[(1, 1), (2, 2), (3, 1), (4, 2), (5, 1)]),
        )?
        .add_posting(
            &config,
            PostingChain::Truncate("top".to_string()),
            key("rust"),
            &posting(&config, &[(2, 2), (4, 2)]),
        )?
        .build();
    // no truncate chain, read through the main one
    let seg1 = InMemorySegmentData::builder(10, 10)
        .add_posting(
            &config,
            PostingChain::Main,
            key("rust"),
            &posting(&config, &[(0, 1), (1, 1)]),
        )?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0), Arc::new(seg1)])?;

    let truncated = term("title", "rust").with_truncate_name("top".to_string());
    let mut posting_iter = index_reader
        .lookup(&truncated, PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.term_meta(), &TermMeta::new(7, 9, 0));
    assert_eq!(posting_iter.truncate_term_meta(), &TermMeta::new(4, 6, 0));
    assert_eq!(get_all_docs(posting_iter.as_mut())?, vec![2, 4, 10, 11]);

    assert_eq!(
        lookup_docs(index_reader.as_ref(), &term("title", "rust"), PostingType::Normal)?,
        vec![1, 2, 3, 4, 5, 10, 11]
    );

    let unknown = term("title", "rust").with_truncate_name("bottom".to_string());
    assert!(matches!(
        index_reader.lookup(&unknown, PostingType::Normal),
        Err(KensakuError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn test_truncate_chain_without_parent_chain() -> Result<()> {
    let mut config = text_config("title");
    config.truncate_profiles = vec!["top".to_string()];
    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_posting(
            &config,
            PostingChain::Truncate("top".to_string()),
            key("orphan"),
            &posting(&config, &[(3, 1), (6, 1)]),
        )?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0)])?;

    let truncated = term("title", "orphan").with_truncate_name("top".to_string());
    let mut posting_iter = index_reader
        .lookup(&truncated, PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.term_meta(), &TermMeta::new(2, 2, 0));
    assert_eq!(posting_iter.truncate_term_meta(), &TermMeta::new(2, 2, 0));
    assert_eq!(get_all_docs(posting_iter.as_mut())?, vec![3, 6]);
    Ok(())
}

#[test]
fn test_bitmap_only_terms() -> Result<()> {
    let mut config = text_config("title");
    config.truncate_profiles = vec!["top".to_string()];
    config.high_frequency = Some(HighFrequencyConfig {
        vocabulary: vec!["the".to_string()],
        posting_type: HighFrequencyTermPostingType::Bitmap,
    });

    let seg0 = InMemorySegmentData::builder(0, 100)
        .add_bitmap("title", key("the"), &[1, 5, 70], &TermMeta::new(3, 3, 0))?
        .add_posting(
            &config,
            PostingChain::Truncate("top".to_string()),
            key("the"),
            &posting(&config, &[(5, 1)]),
        )?
        .build();
    let seg1 = InMemorySegmentData::builder(100, 50)
        .add_bitmap("title", key("the"), &[0, 49], &TermMeta::new(2, 2, 0))?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0), Arc::new(seg1)])?;

    let the = term("title", "the");
    assert!(index_reader.lookup(&the, PostingType::Normal)?.is_none());

    let mut bitmap_iter = index_reader.lookup(&the, PostingType::Bitmap)?.unwrap();
    assert_eq!(bitmap_iter.term_meta(), &TermMeta::new(5, 5, 0));
    assert_eq!(get_all_docs(bitmap_iter.as_mut())?, vec![1, 5, 70, 100, 149]);

    // the truncated chain reports the bitmap chain's statistics
    let truncated = the.clone().with_truncate_name("top".to_string());
    let mut posting_iter = index_reader
        .lookup(&truncated, PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.term_meta(), &TermMeta::new(3, 3, 0));
    assert_eq!(posting_iter.truncate_term_meta(), &TermMeta::new(1, 1, 0));
    assert_eq!(get_all_docs(posting_iter.as_mut())?, vec![5]);

    assert!(index_reader
        .lookup(&term("title", "a"), PostingType::Bitmap)?
        .is_none());
    Ok(())
}

#[test]
fn test_high_frequency_terms_with_both_chains() -> Result<()> {
    let mut config = text_config("title");
    config.high_frequency = Some(HighFrequencyConfig {
        vocabulary: vec!["the".to_string()],
        posting_type: HighFrequencyTermPostingType::Both,
    });
    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_bitmap("title", key("the"), &[2, 3], &TermMeta::new(2, 2, 0))?
        .add_posting(
            &config,
            PostingChain::Main,
            key("the"),
            &posting(&config, &[(2, 1), (3, 1)]),
        )?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0)])?;

    let the = term("title", "the");
    assert_eq!(lookup_docs(index_reader.as_ref(), &the, PostingType::Normal)?, vec![2, 3]);
    assert_eq!(lookup_docs(index_reader.as_ref(), &the, PostingType::Bitmap)?, vec![2, 3]);
    Ok(())
}

#[test]
fn test_dict_inline_postings() -> Result<()> {
    let mut config = text_config("title");
    config.posting_format.dict_inline = true;

    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_posting(
            &config,
            PostingChain::Main,
            key("run"),
            &posting(&config, &[(3, 2), (4, 2), (5, 2)]),
        )?
        .build();
    let seg1 = InMemorySegmentData::builder(10, 10)
        .add_posting(
            &config,
            PostingChain::Main,
            key("run"),
            &posting(&config, &[(7, 1)]),
        )?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0), Arc::new(seg1)])?;

    let mut posting_iter = index_reader
        .lookup(&term("title", "run"), PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.term_meta(), &TermMeta::new(4, 7, 0));
    let mut match_data = TermMatchData::default();
    for expect in [3, 4, 5] {
        assert_eq!(posting_iter.seek_doc(0)?, expect);
        posting_iter.unpack(&mut match_data)?;
        assert_eq!(match_data.tf, 2);
    }
    assert_eq!(posting_iter.seek_doc(0)?, 17);
    posting_iter.unpack(&mut match_data)?;
    assert_eq!(match_data.tf, 1);
    assert_eq!(posting_iter.seek_doc(0)?, INVALID_DOCID);
    Ok(())
}

#[test]
fn test_seek_past_dict_inline_posting() -> Result<()> {
    let mut config = text_config("title");
    config.posting_format.dict_inline = true;

    let inline_segment = || {
        InMemorySegmentData::builder(0, 10)
            .add_posting(
                &config,
                PostingChain::Main,
                key("run"),
                &posting(&config, &[(3, 1), (4, 1), (5, 1)]),
            )
            .map(|builder| builder.build())
    };

    let index_reader = open(&config, vec![Arc::new(inline_segment()?)])?;
    let mut posting_iter = index_reader
        .lookup(&term("title", "run"), PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.seek_doc(7)?, INVALID_DOCID);
    assert_eq!(posting_iter.seek_doc(8)?, INVALID_DOCID);

    let mut building = InvertedIndexBuildingSegmentReader::new(config.posting_format_option());
    building.posting_writer(key("run")).end_doc(7, 0);
    let building_segment = InMemorySegmentData::builder(10, 10)
        .add_building_index("title", Arc::new(building))
        .build();
    let index_reader = open(
        &config,
        vec![Arc::new(inline_segment()?), Arc::new(building_segment)],
    )?;
    let mut posting_iter = index_reader
        .lookup(&term("title", "run"), PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.seek_doc(4)?, 4);
    assert_eq!(posting_iter.seek_doc(7)?, 17);
    assert_eq!(posting_iter.seek_doc(18)?, INVALID_DOCID);
    Ok(())
}

#[test]
fn test_reference_compressed_segment() -> Result<()> {
    let mut config = text_config("title");
    config.posting_format.reference_compress = true;

    let docs: Vec<_> = (0..1000).step_by(3).map(|d| (d, 1)).collect();
    let seg0 = InMemorySegmentData::builder(0, 1000)
        .add_posting(&config, PostingChain::Main, key("every"), &posting(&config, &docs))?
        .build();
    let index_reader = open(&config, vec![Arc::new(seg0)])?;

    let mut posting_iter = index_reader
        .lookup(&term("title", "every"), PostingType::Normal)?
        .unwrap();
    assert_eq!(posting_iter.seek_doc(1)?, 3);
    assert_eq!(posting_iter.seek_doc(500)?, 501);
    assert_eq!(posting_iter.seek_doc(998)?, 999);
    assert_eq!(posting_iter.seek_doc(1000)?, INVALID_DOCID);
    Ok(())
}

#[test]
fn test_sharded_index() -> Result<()> {
    let mut config = text_config("title");
    config.sharding = Some(ShardingConfig { shard_count: 2 });

    let words = ["apple", "banana", "cherry", "durian", "elder"];
    let mut builder = InMemorySegmentData::builder(0, 20);
    for (i, word) in words.iter().enumerate() {
        let shard = shard_index(key(word), 2);
        let shard_config = config.shard_config(shard);
        let docid = i as DocId * 3;
        builder.add_posting(
            &shard_config,
            PostingChain::Main,
            key(word),
            &posting(&shard_config, &[(docid, 1), (docid + 1, 1)]),
        )?;
    }
    let index_reader = open(&config, vec![Arc::new(builder.build())])?;

    for (i, word) in words.iter().enumerate() {
        let docid = i as DocId * 3;
        assert_eq!(
            lookup_docs(index_reader.as_ref(), &term("title", word), PostingType::Normal)?,
            vec![docid, docid + 1]
        );
    }
    let sharding_reader = index_reader
        .downcast_arc::<MultiShardingIndexReader>()
        .ok()
        .unwrap();
    assert_eq!(sharding_reader.shard_count(), 2);
    assert!(sharding_reader.shard(0).is_some());
    assert!(sharding_reader.shard(2).is_none());
    Ok(())
}

#[test]
fn test_sharded_reader_type_mismatch() -> Result<()> {
    let mut config = IndexConfig::new("price");
    config.index_type = IndexType::Range;
    config.sharding = Some(ShardingConfig { shard_count: 2 });
    assert!(matches!(
        open(&config, vec![]),
        Err(KensakuError::InconsistentConfig(_))
    ));

    let mut config = text_config("title");
    config.sharding = Some(ShardingConfig { shard_count: 3 });
    let shard: Arc<dyn IndexReader> = Arc::new(NormalIndexReader::open(
        config.shard_config(0),
        &[],
        IndexReaderOptions::default(),
    )?);
    assert!(matches!(
        MultiShardingIndexReader::open(config, vec![shard]),
        Err(KensakuError::InconsistentConfig(_))
    ));
    Ok(())
}

#[test]
fn test_segment_order() -> Result<()> {
    let config = text_config("title");
    let seg0 = Arc::new(InMemorySegmentData::builder(0, 10).build());
    let seg1 = Arc::new(InMemorySegmentData::builder(10, 10).build());
    assert!(matches!(
        open(&config, vec![seg1.clone(), seg0.clone()]),
        Err(KensakuError::InvalidArgument(_))
    ));

    let building = InvertedIndexBuildingSegmentReader::new(config.posting_format_option());
    let building = Arc::new(
        InMemorySegmentData::builder(0, 10)
            .add_building_index("title", Arc::new(building))
            .build(),
    );
    assert!(matches!(
        open(&config, vec![building, seg1]),
        Err(KensakuError::InvalidArgument(_))
    ));
    Ok(())
}

#[test]
fn test_key_iterator() -> Result<()> {
    let config = text_config("title");
    let seg0 = InMemorySegmentData::builder(0, 10)
        .add_posting(&config, PostingChain::Main, key("a"), &posting(&config, &[(1, 1)]))?
        .add_posting(&config, PostingChain::Main, key("b"), &posting(&config, &[(2, 1)]))?
        .build();
    let mut building = InvertedIndexBuildingSegmentReader::new(config.posting_format_option());
    building.posting_writer(key("b")).end_doc(0, 0);
    building.posting_writer(key("c")).end_doc(1, 0);
    let seg1 = InMemorySegmentData::builder(10, 10)
        .add_building_index("title", Arc::new(building))
        .build();
    let segments: Vec<Arc<dyn SegmentDataProvider>> = vec![Arc::new(seg0), Arc::new(seg1)];
    let index_reader = NormalIndexReader::open(config, &segments, IndexReaderOptions::default())?;

    let mut expect = vec![
        (key("a"), vec![1]),
        (key("b"), vec![2, 10]),
        (key("c"), vec![11]),
    ];
    expect.sort();
    let key_iter = KeyIterator::new(&index_reader);
    assert_eq!(key_iter.key_count(), 3);
    let mut found = vec![];
    for item in key_iter {
        let (key, mut posting_iter) = item?;
        found.push((key, get_all_docs(posting_iter.as_mut())?));
    }
    assert_eq!(found, expect);
    Ok(())
}

struct FailingFile {
    len: usize,
}

impl FileReader for FailingFile {
    fn len(&self) -> usize {
        self.len
    }

    fn read_at(&self, _offset: usize, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
    }
}

/// Serves the dictionaries of `inner` but fails every posting read.
struct FailingSegment {
    inner: InMemorySegmentData,
    fail_dictionary: bool,
}

impl SegmentDataProvider for FailingSegment {
    fn base_docid(&self) -> DocId {
        self.inner.base_docid()
    }

    fn doc_count(&self) -> usize {
        self.inner.doc_count()
    }

    fn open_dictionary(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn DictionaryReader>>> {
        if self.fail_dictionary {
            return Err(io::Error::new(io::ErrorKind::NotFound, "dictionary missing").into());
        }
        self.inner.open_dictionary(index_name, chain)
    }

    fn open_posting_file(
        &self,
        index_name: &str,
        chain: &PostingChain,
    ) -> Result<Option<Arc<dyn FileReader>>> {
        Ok(self
            .inner
            .open_posting_file(index_name, chain)?
            .map(|file| Arc::new(FailingFile { len: file.len() }) as Arc<dyn FileReader>))
    }

    fn building_index(&self, index_name: &str) -> Option<Arc<dyn BuildingIndexSegmentReader>> {
        self.inner.building_index(index_name)
    }
}

#[test]
fn test_io_errors_propagate() -> Result<()> {
    let config = text_config("title");
    let build = || -> Result<InMemorySegmentData> {
        Ok(InMemorySegmentData::builder(0, 10)
            .add_posting(
                &config,
                PostingChain::Main,
                key("lost"),
                &posting(&config, &[(1, 1), (4, 1)]),
            )?
            .build())
    };

    let segment = FailingSegment {
        inner: build()?,
        fail_dictionary: false,
    };
    let index_reader = open(&config, vec![Arc::new(segment)])?;
    let result = index_reader
        .lookup(&term("title", "lost"), PostingType::Normal)
        .and_then(|posting_iter| match posting_iter {
            Some(mut posting_iter) => posting_iter.seek_doc(0).map(|_| ()),
            None => Ok(()),
        });
    assert!(matches!(result, Err(KensakuError::FileIo(_))));

    let segment = FailingSegment {
        inner: build()?,
        fail_dictionary: true,
    };
    let result = open(&config, vec![Arc::new(segment)]);
    assert!(result.is_err_and(|e| e.is_file_io()));
    Ok(())
}
