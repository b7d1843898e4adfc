use std::io::{self, Write};

use crate::{util::ImmutableBitset, DocId};

use super::{
    compression::BlockEncoder, ByteSliceList, ByteSliceReader, PostingFormatOption, TermMeta,
    TermMetaDumper, TermMetaLoader,
};

/// Doc set of a high-frequency term in one segment, kept as a bitmap over
/// local doc ids.
pub struct BitmapPosting {
    pub term_meta: TermMeta,
    pub bitset: ImmutableBitset,
}

impl BitmapPosting {
    pub fn load(list: &ByteSliceList) -> io::Result<Self> {
        let mut reader = ByteSliceReader::open(list.clone());
        let term_meta = TermMetaLoader::new(PostingFormatOption::default()).load(&mut reader)?;
        let word_count = BlockEncoder.read_vu32(&mut reader)? as usize;
        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(reader.read_u64_le()?);
        }
        Ok(Self {
            term_meta,
            bitset: ImmutableBitset::new(words),
        })
    }

    /// `docids` are local and ascending.
    pub fn dump<W: Write>(
        docids: &[DocId],
        term_meta: &TermMeta,
        writer: &mut W,
    ) -> io::Result<usize> {
        let capacity = docids.last().map_or(0, |&last| last as usize + 1);
        let bitset = ImmutableBitset::from_indices(capacity, docids.iter().map(|&d| d as usize));
        let mut written =
            TermMetaDumper::new(PostingFormatOption::default()).dump(term_meta, writer)?;
        written += BlockEncoder.write_vu32(bitset.data().len() as u32, writer)?;
        for word in bitset.data() {
            writer.write_all(&word.to_le_bytes())?;
        }
        Ok(written + bitset.data().len() * 8)
    }
}
