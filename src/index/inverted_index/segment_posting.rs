use crate::{
    postings::{
        ByteSliceList, ByteSliceReader, CompressMode, DictInlineFormatter, PostingFormatOption,
        PostingHeader, PostingWriter, TermMeta, TermMetaLoader, TermPostingInfo,
    },
    DocId, Result,
};

/// The posting of one term in one segment.
///
/// Built per lookup and read-only afterwards. Cloning is cheap: a slice list
/// only holds a shared file handle, and a building segment's posting writer
/// is borrowed from the segment, which outlives every lookup result.
#[derive(Clone)]
pub struct SegmentPosting<'a> {
    base_docid: DocId,
    doc_count: usize,
    compress_mode: CompressMode,
    main_chain_term_meta: Option<TermMeta>,
    option: PostingFormatOption,
    data: SegmentPostingData<'a>,
}

#[derive(Clone)]
pub enum SegmentPostingData<'a> {
    SliceList(ByteSliceList),
    DictInline(u64),
    RealTime(&'a PostingWriter),
}

impl<'a> SegmentPosting<'a> {
    pub fn new_slice_list(
        base_docid: DocId,
        doc_count: usize,
        slice_list: ByteSliceList,
        option: PostingFormatOption,
    ) -> Self {
        Self::new_with_compress_mode(
            base_docid,
            doc_count,
            CompressMode::NORMAL,
            slice_list,
            option,
        )
    }

    pub fn new_with_compress_mode(
        base_docid: DocId,
        doc_count: usize,
        compress_mode: CompressMode,
        slice_list: ByteSliceList,
        option: PostingFormatOption,
    ) -> Self {
        Self {
            base_docid,
            doc_count,
            compress_mode,
            main_chain_term_meta: None,
            option,
            data: SegmentPostingData::SliceList(slice_list),
        }
    }

    pub fn new_dict_inline(
        base_docid: DocId,
        doc_count: usize,
        dict_inline_value: u64,
        option: PostingFormatOption,
    ) -> Self {
        Self {
            base_docid,
            doc_count,
            compress_mode: CompressMode::DICT_INLINE,
            main_chain_term_meta: None,
            option,
            data: SegmentPostingData::DictInline(dict_inline_value),
        }
    }

    pub fn new_realtime(
        base_docid: DocId,
        doc_count: usize,
        posting_writer: &'a PostingWriter,
    ) -> Self {
        Self {
            base_docid,
            doc_count,
            compress_mode: CompressMode::NORMAL,
            main_chain_term_meta: Some(posting_writer.term_meta()),
            option: posting_writer.option(),
            data: SegmentPostingData::RealTime(posting_writer),
        }
    }

    pub fn base_docid(&self) -> DocId {
        self.base_docid
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn compress_mode(&self) -> CompressMode {
        self.compress_mode
    }

    /// The format option as the posting's records are laid out.
    pub fn option(&self) -> PostingFormatOption {
        self.option.with_compress_mode(self.compress_mode)
    }

    pub fn data(&self) -> &SegmentPostingData<'a> {
        &self.data
    }

    pub fn is_dict_inline(&self) -> bool {
        self.compress_mode.is_dict_inline()
    }

    pub fn is_realtime_segment(&self) -> bool {
        matches!(self.data, SegmentPostingData::RealTime(_))
    }

    /// Term meta of the posting this descriptor points at, which is the
    /// truncated one for a truncate chain.
    pub fn current_term_meta(&self) -> Result<TermMeta> {
        match &self.data {
            SegmentPostingData::DictInline(value) => {
                let posting = DictInlineFormatter::new(self.option()).decode(*value)?;
                Ok(posting.term_meta())
            }
            SegmentPostingData::RealTime(posting_writer) => Ok(posting_writer.term_meta()),
            SegmentPostingData::SliceList(slice_list) => {
                let mut reader = ByteSliceReader::open(slice_list.clone());
                Ok(TermMetaLoader::new(self.option()).load(&mut reader)?)
            }
        }
    }

    /// Term meta of the full chain, which differs from the current one only
    /// for truncated postings.
    pub fn main_chain_term_meta(&self) -> Result<TermMeta> {
        match self.main_chain_term_meta {
            Some(term_meta) => Ok(term_meta),
            None => self.current_term_meta(),
        }
    }

    pub fn set_main_chain_term_meta(&mut self, term_meta: TermMeta) {
        self.main_chain_term_meta = Some(term_meta);
    }

    /// Section sizes, for dumped postings only.
    pub fn term_posting_info(&self) -> Result<Option<TermPostingInfo>> {
        match &self.data {
            SegmentPostingData::SliceList(slice_list) => {
                Ok(Some(PostingHeader::load(slice_list, self.option())?.info))
            }
            _ => Ok(None),
        }
    }
}
