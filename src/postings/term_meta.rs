use std::io::{self, Read, Write};

use crate::{store::FileReader, DocFreq, TermPayload, TotalTermFreq};

use super::{compression::BlockEncoder, PostingFormatOption};

/// A header is at most a 5-byte df, a 10-byte ttf and a 4-byte payload.
const MAX_TERM_META_SIZE: usize = 19;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TermMeta {
    pub doc_freq: DocFreq,
    pub total_term_freq: TotalTermFreq,
    pub payload: TermPayload,
}

impl TermMeta {
    pub fn new(doc_freq: DocFreq, total_term_freq: TotalTermFreq, payload: TermPayload) -> Self {
        Self {
            doc_freq,
            total_term_freq,
            payload,
        }
    }
}

pub struct TermMetaLoader {
    option: PostingFormatOption,
}

impl TermMetaLoader {
    pub fn new(option: PostingFormatOption) -> Self {
        Self { option }
    }

    fn has_ttf(&self) -> bool {
        !self.option.is_compressed_header() || self.option.has_tflist()
    }

    fn has_payload(&self) -> bool {
        !self.option.is_compressed_header() || self.option.has_term_payload()
    }

    pub fn load<R: Read>(&self, reader: &mut R) -> io::Result<TermMeta> {
        let block_encoder = BlockEncoder;
        let doc_freq = block_encoder.read_vu32(reader)? as DocFreq;
        let total_term_freq = if self.has_ttf() {
            block_encoder.read_vu64(reader)? as TotalTermFreq
        } else {
            doc_freq as TotalTermFreq
        };
        let payload = if self.has_payload() {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            TermPayload::from_le_bytes(buf)
        } else {
            0
        };
        Ok(TermMeta::new(doc_freq, total_term_freq, payload))
    }

    /// Decodes the header starting at `offset` of `file`, returning the meta
    /// and the header length.
    pub fn load_from_file(
        &self,
        file: &dyn FileReader,
        offset: usize,
    ) -> io::Result<(TermMeta, usize)> {
        let mut buf = [0u8; MAX_TERM_META_SIZE];
        let len = std::cmp::min(MAX_TERM_META_SIZE, file.len().saturating_sub(offset));
        file.read_exact_at(offset, &mut buf[..len])?;
        self.load_from_bytes(&buf[..len])
    }

    /// Decodes the header at the start of `data`, returning the meta and the
    /// header length.
    pub fn load_from_bytes(&self, data: &[u8]) -> io::Result<(TermMeta, usize)> {
        let mut remain = data;
        let term_meta = self.load(&mut remain)?;
        Ok((term_meta, data.len() - remain.len()))
    }
}

pub struct TermMetaDumper {
    option: PostingFormatOption,
}

impl TermMetaDumper {
    pub fn new(option: PostingFormatOption) -> Self {
        Self { option }
    }

    pub fn dump<W: Write>(&self, term_meta: &TermMeta, writer: &mut W) -> io::Result<usize> {
        let block_encoder = BlockEncoder;
        let mut written = block_encoder.write_vu32(term_meta.doc_freq as u32, writer)?;
        if !self.option.is_compressed_header() || self.option.has_tflist() {
            written += block_encoder.write_vu64(term_meta.total_term_freq as u64, writer)?;
        }
        if !self.option.is_compressed_header() || self.option.has_term_payload() {
            writer.write_all(&term_meta.payload.to_le_bytes())?;
            written += 4;
        }
        Ok(written)
    }
}

/// Sums doc freq and total term freq over segments. The payload is taken
/// from the last segment added.
#[derive(Default)]
pub struct MultiSegmentTermMetaCalculator {
    doc_freq: DocFreq,
    total_term_freq: TotalTermFreq,
    payload: TermPayload,
}

impl MultiSegmentTermMetaCalculator {
    pub fn add_segment(&mut self, term_meta: &TermMeta) {
        self.doc_freq += term_meta.doc_freq;
        self.total_term_freq += term_meta.total_term_freq;
        self.payload = term_meta.payload;
    }

    pub fn term_meta(&self) -> TermMeta {
        TermMeta::new(self.doc_freq, self.total_term_freq, self.payload)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
