use crate::{KensakuError, Result};

const DOC_COMPRESS_MASK: u8 = 0x03;
const DICT_VALUE_SHIFT: u32 = 56;
const DICT_VALUE_MASK: u64 = (1 << DICT_VALUE_SHIFT) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCompressType {
    /// Delta-coded doc id records.
    Normal,
    /// Base plus fixed-width offsets, seekable by binary search.
    Reference,
    /// The whole posting lives in the dictionary value.
    DictInline,
}

/// The tag byte stored next to a dictionary value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressMode(u8);

impl CompressMode {
    pub const NORMAL: CompressMode = CompressMode(0);
    pub const REFERENCE: CompressMode = CompressMode(1);
    pub const DICT_INLINE: CompressMode = CompressMode(2);

    pub fn from_u8(value: u8) -> Result<Self> {
        if value & DOC_COMPRESS_MASK == DOC_COMPRESS_MASK {
            return Err(KensakuError::IndexCollapsed(format!(
                "unknown compress mode {:#x}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn doc_compress_type(&self) -> DocCompressType {
        match self.0 & DOC_COMPRESS_MASK {
            1 => DocCompressType::Reference,
            2 => DocCompressType::DictInline,
            _ => DocCompressType::Normal,
        }
    }

    pub fn is_dict_inline(&self) -> bool {
        self.doc_compress_type() == DocCompressType::DictInline
    }

    pub fn is_reference(&self) -> bool {
        self.doc_compress_type() == DocCompressType::Reference
    }
}

/// Packs a compress mode and a 56-bit posting offset or inline value into
/// one dictionary value.
pub fn compose_dict_value(compress_mode: CompressMode, value: u64) -> u64 {
    debug_assert!(value <= DICT_VALUE_MASK);
    ((compress_mode.as_u8() as u64) << DICT_VALUE_SHIFT) | (value & DICT_VALUE_MASK)
}

pub fn split_dict_value(dict_value: u64) -> Result<(CompressMode, u64)> {
    let compress_mode = CompressMode::from_u8((dict_value >> DICT_VALUE_SHIFT) as u8)?;
    Ok((compress_mode, dict_value & DICT_VALUE_MASK))
}
