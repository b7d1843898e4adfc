use bitflags::bitflags;

use super::CompressMode;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OptionFlag: u8 {
        const TERM_FREQUENCY = 1;
        const DOC_PAYLOAD = 1 << 1;
        const FIELD_MAP = 1 << 2;
        const POSITION_LIST = 1 << 3;
        const TERM_PAYLOAD = 1 << 4;
        const REFERENCE_COMPRESS = 1 << 5;
        const COMPRESSED_HEADER = 1 << 6;
    }
}

/// Which sections a posting carries, and how its header and records are
/// laid out. The option travels next to the posting, it is never written
/// into the records themselves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostingFormatOption {
    flags: OptionFlag,
}

#[derive(Default)]
pub struct PostingFormatOptionBuilder {
    flags: OptionFlag,
}

impl PostingFormatOptionBuilder {
    pub fn with_tflist(mut self) -> Self {
        self.flags |= OptionFlag::TERM_FREQUENCY;
        self
    }

    pub fn with_doc_payload(mut self) -> Self {
        self.flags |= OptionFlag::DOC_PAYLOAD;
        self
    }

    pub fn with_fieldmap(mut self) -> Self {
        self.flags |= OptionFlag::FIELD_MAP;
        self
    }

    /// Positions are located through the running total term frequency, so a
    /// position list always comes with a tf list.
    pub fn with_position_list(mut self) -> Self {
        self.flags |= OptionFlag::POSITION_LIST | OptionFlag::TERM_FREQUENCY;
        self
    }

    pub fn with_term_payload(mut self) -> Self {
        self.flags |= OptionFlag::TERM_PAYLOAD;
        self
    }

    pub fn with_reference_compress(mut self) -> Self {
        self.flags |= OptionFlag::REFERENCE_COMPRESS;
        self
    }

    pub fn with_compressed_header(mut self) -> Self {
        self.flags |= OptionFlag::COMPRESSED_HEADER;
        self
    }

    pub fn build(self) -> PostingFormatOption {
        PostingFormatOption { flags: self.flags }
    }
}

impl PostingFormatOption {
    pub fn builder() -> PostingFormatOptionBuilder {
        PostingFormatOptionBuilder::default()
    }

    pub fn from_bits(bits: u8) -> Self {
        let mut flags = OptionFlag::from_bits_truncate(bits);
        if flags.contains(OptionFlag::POSITION_LIST) {
            flags |= OptionFlag::TERM_FREQUENCY;
        }
        Self { flags }
    }

    pub fn bits(&self) -> u8 {
        self.flags.bits()
    }

    pub fn flags(&self) -> OptionFlag {
        self.flags
    }

    pub fn has_tflist(&self) -> bool {
        self.flags.contains(OptionFlag::TERM_FREQUENCY)
    }

    pub fn has_doc_payload(&self) -> bool {
        self.flags.contains(OptionFlag::DOC_PAYLOAD)
    }

    pub fn has_fieldmap(&self) -> bool {
        self.flags.contains(OptionFlag::FIELD_MAP)
    }

    pub fn has_position_list(&self) -> bool {
        self.flags.contains(OptionFlag::POSITION_LIST)
    }

    pub fn has_term_payload(&self) -> bool {
        self.flags.contains(OptionFlag::TERM_PAYLOAD)
    }

    pub fn is_reference_compressed(&self) -> bool {
        self.flags.contains(OptionFlag::REFERENCE_COMPRESS)
    }

    pub fn is_compressed_header(&self) -> bool {
        self.flags.contains(OptionFlag::COMPRESSED_HEADER)
    }

    /// True when a record carries nothing besides doc ids.
    pub fn is_only_docid(&self) -> bool {
        !self.has_tflist() && !self.has_doc_payload() && !self.has_fieldmap()
    }

    /// The option a posting stored with `compress_mode` is decoded with:
    /// the reference bit follows the segment's compress mode.
    pub fn with_compress_mode(&self, compress_mode: CompressMode) -> Self {
        let mut flags = self.flags;
        flags.set(OptionFlag::REFERENCE_COMPRESS, compress_mode.is_reference());
        Self { flags }
    }
}
