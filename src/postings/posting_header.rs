use std::io::{self, Seek, SeekFrom};

use super::{
    compression::BlockEncoder, ByteSliceList, ByteSliceReader, PostingFormatOption, TermMeta,
    TermMetaLoader,
};

/// Sizes of the sections of one dumped posting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TermPostingInfo {
    pub doc_skip_list_size: usize,
    pub doc_list_size: usize,
    pub pos_skip_list_size: usize,
    pub pos_list_size: usize,
}

impl TermPostingInfo {
    pub fn add(&mut self, other: &TermPostingInfo) {
        self.doc_skip_list_size += other.doc_skip_list_size;
        self.doc_list_size += other.doc_list_size;
        self.pos_skip_list_size += other.pos_skip_list_size;
        self.pos_list_size += other.pos_list_size;
    }
}

/// Term meta plus the offsets of every section of a posting, relative to
/// the start of the posting.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostingHeader {
    pub term_meta: TermMeta,
    pub doc_skip_list_offset: usize,
    pub doc_list_offset: usize,
    pub pos_skip_list_offset: usize,
    pub pos_list_offset: usize,
    pub info: TermPostingInfo,
}

impl PostingHeader {
    pub fn load(list: &ByteSliceList, option: PostingFormatOption) -> io::Result<Self> {
        let mut reader = ByteSliceReader::open(list.clone());
        Self::load_from_reader(&mut reader, option)
    }

    pub fn load_from_reader(
        reader: &mut ByteSliceReader,
        option: PostingFormatOption,
    ) -> io::Result<Self> {
        let block_encoder = BlockEncoder;
        let term_meta = TermMetaLoader::new(option).load(reader)?;
        let mut info = TermPostingInfo {
            doc_skip_list_size: block_encoder.read_vu32(reader)? as usize,
            doc_list_size: block_encoder.read_vu32(reader)? as usize,
            ..Default::default()
        };
        let doc_skip_list_offset = reader.tell();
        let doc_list_offset = doc_skip_list_offset + info.doc_skip_list_size;
        let mut header = Self {
            term_meta,
            doc_skip_list_offset,
            doc_list_offset,
            pos_skip_list_offset: 0,
            pos_list_offset: 0,
            info,
        };
        if option.has_position_list() {
            reader.seek(SeekFrom::Start(
                (doc_list_offset + info.doc_list_size) as u64,
            ))?;
            info.pos_skip_list_size = block_encoder.read_vu32(reader)? as usize;
            info.pos_list_size = block_encoder.read_vu32(reader)? as usize;
            header.pos_skip_list_offset = reader.tell();
            header.pos_list_offset = header.pos_skip_list_offset + info.pos_skip_list_size;
            header.info = info;
        }
        Ok(header)
    }
}
