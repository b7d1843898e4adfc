use std::io;

use crate::{DocFreq, DocId, DocPayload, FieldMap, TermFreq, TermPayload, TotalTermFreq};

use super::{compression::BlockEncoder, PostingFormatOption, TermMeta};

/// Bytes available in a dictionary value once the compress mode byte is
/// taken.
const DICT_INLINE_BYTES: usize = 7;

/// A posting small enough to live in its dictionary value: `doc_freq`
/// consecutive doc ids starting at `docid`, all sharing one tf, doc payload
/// and field map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DictInlinePosting {
    pub term_payload: TermPayload,
    pub docid: DocId,
    pub doc_payload: DocPayload,
    pub term_freq: TermFreq,
    pub field_map: FieldMap,
    pub doc_freq: DocFreq,
}

impl DictInlinePosting {
    pub fn term_meta(&self) -> TermMeta {
        TermMeta::new(
            self.doc_freq,
            self.term_freq as TotalTermFreq * self.doc_freq as TotalTermFreq,
            self.term_payload,
        )
    }

    pub fn last_docid(&self) -> DocId {
        self.docid + self.doc_freq - 1
    }
}

pub struct DictInlineFormatter {
    option: PostingFormatOption,
}

impl DictInlineFormatter {
    pub fn new(option: PostingFormatOption) -> Self {
        Self { option }
    }

    fn values(&self, posting: &DictInlinePosting) -> Vec<u32> {
        let mut values = Vec::with_capacity(DICT_INLINE_BYTES);
        if self.option.has_term_payload() {
            values.push(posting.term_payload);
        }
        values.push(posting.docid as u32);
        if self.option.has_doc_payload() {
            values.push(posting.doc_payload as u32);
        }
        if self.option.has_tflist() {
            values.push(posting.term_freq);
        }
        if self.option.has_fieldmap() {
            values.push(posting.field_map as u32);
        }
        values.push(posting.doc_freq as u32);
        values
    }

    /// Packs the posting into 56 bits, or returns `None` when it doesn't fit
    /// or carries positions.
    pub fn try_encode(&self, posting: &DictInlinePosting) -> Option<u64> {
        if self.option.has_position_list() || posting.doc_freq <= 0 || posting.docid < 0 {
            return None;
        }
        let block_encoder = BlockEncoder;
        let mut bytes = Vec::with_capacity(DICT_INLINE_BYTES);
        for value in self.values(posting) {
            block_encoder.write_vu32(value, &mut bytes).ok()?;
        }
        if bytes.len() > DICT_INLINE_BYTES {
            return None;
        }
        let mut packed = [0u8; 8];
        packed[..bytes.len()].copy_from_slice(&bytes);
        Some(u64::from_le_bytes(packed))
    }

    pub fn decode(&self, value: u64) -> io::Result<DictInlinePosting> {
        let bytes = value.to_le_bytes();
        let mut reader = &bytes[..DICT_INLINE_BYTES];
        let block_encoder = BlockEncoder;
        let mut posting = DictInlinePosting {
            term_freq: 1,
            ..Default::default()
        };
        if self.option.has_term_payload() {
            posting.term_payload = block_encoder.read_vu32(&mut reader)?;
        }
        posting.docid = block_encoder.read_vu32(&mut reader)? as DocId;
        if self.option.has_doc_payload() {
            posting.doc_payload = block_encoder.read_vu32(&mut reader)? as DocPayload;
        }
        if self.option.has_tflist() {
            posting.term_freq = block_encoder.read_vu32(&mut reader)?;
        }
        if self.option.has_fieldmap() {
            posting.field_map = block_encoder.read_vu32(&mut reader)? as FieldMap;
        }
        posting.doc_freq = block_encoder.read_vu32(&mut reader)? as DocFreq;
        if posting.doc_freq <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "dict inline posting without docs",
            ));
        }
        Ok(posting)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::postings::{PostingFormatOption, TermMeta};

    use super::{DictInlineFormatter, DictInlinePosting};

    #[test]
    fn test_encode_decode() -> io::Result<()> {
        let option = PostingFormatOption::builder()
            .with_tflist()
            .with_fieldmap()
            .with_term_payload()
            .build();
        let formatter = DictInlineFormatter::new(option);
        let posting = DictInlinePosting {
            term_payload: 3,
            docid: 1000,
            doc_payload: 0,
            term_freq: 2,
            field_map: 0b101,
            doc_freq: 4,
        };
        let value = formatter.try_encode(&posting).unwrap();
        assert_eq!(value >> 56, 0);
        let decoded = formatter.decode(value)?;
        assert_eq!(decoded, posting);
        assert_eq!(decoded.term_meta(), TermMeta::new(4, 8, 3));
        assert_eq!(decoded.last_docid(), 1003);
        Ok(())
    }

    #[test]
    fn test_only_docid() -> io::Result<()> {
        let formatter = DictInlineFormatter::new(PostingFormatOption::default());
        let posting = DictInlinePosting {
            docid: 7,
            term_freq: 1,
            doc_freq: 1,
            ..Default::default()
        };
        let decoded = formatter.decode(formatter.try_encode(&posting).unwrap())?;
        assert_eq!(decoded, posting);
        assert_eq!(decoded.term_meta(), TermMeta::new(1, 1, 0));
        Ok(())
    }

    #[test]
    fn test_does_not_fit() {
        let option = PostingFormatOption::builder()
            .with_tflist()
            .with_term_payload()
            .build();
        let formatter = DictInlineFormatter::new(option);
        let posting = DictInlinePosting {
            term_payload: u32::MAX,
            docid: i32::MAX,
            term_freq: 1,
            doc_freq: 1,
            ..Default::default()
        };
        assert!(formatter.try_encode(&posting).is_none());

        let with_positions = DictInlineFormatter::new(
            PostingFormatOption::builder().with_position_list().build(),
        );
        let small = DictInlinePosting {
            docid: 1,
            term_freq: 1,
            doc_freq: 1,
            ..Default::default()
        };
        assert!(with_positions.try_encode(&small).is_none());
    }
}
