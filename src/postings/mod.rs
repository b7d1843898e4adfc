mod bitmap_posting;
mod byte_slice_list;
mod compress_mode;
pub mod compression;
mod dict_inline;
mod doc_list_block;
mod doc_list_decoder;
mod match_data;
mod position_list;
mod posting_dumper;
mod posting_format;
mod posting_header;
mod posting_writer;
mod section;
mod skip_list;
mod term_meta;

pub use bitmap_posting::BitmapPosting;
pub use byte_slice_list::{ByteSliceList, ByteSliceReader, BYTE_SLICE_SIZE};
pub use compress_mode::{compose_dict_value, split_dict_value, CompressMode, DocCompressType};
pub use dict_inline::{DictInlineFormatter, DictInlinePosting};
pub use doc_list_block::DocListBlock;
pub use doc_list_decoder::{
    DictInlineDocListDecoder, DocListDecode, RealTimeDocListDecoder, SliceListDocListDecoder,
};
pub use match_data::TermMatchData;
pub use position_list::{InDocPositionIterator, InDocPositionState, PositionSource};
pub use posting_dumper::PostingDumper;
pub use posting_format::{OptionFlag, PostingFormatOption, PostingFormatOptionBuilder};
pub use posting_header::{PostingHeader, TermPostingInfo};
pub use posting_writer::PostingWriter;
pub use section::{InMemorySectionAttributeReader, SectionAttributeReader, SectionMeta};
pub use skip_list::{SkipListEntry, SkipListReader};
pub use term_meta::{MultiSegmentTermMetaCalculator, TermMeta, TermMetaDumper, TermMetaLoader};
