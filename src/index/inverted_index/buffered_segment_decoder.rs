use std::io;

use crate::{
    postings::{
        DictInlineDocListDecoder, DocListBlock, DocListDecode, PositionSource,
        RealTimeDocListDecoder, SliceListDocListDecoder,
    },
    DocId, Result,
};

use super::{segment_posting::SegmentPostingData, SegmentPosting};

/// Decoder of one segment's posting, in global doc ids.
pub struct BufferedSegmentDecoder<'a> {
    base_docid: DocId,
    inner_decoder: SegmentDecoderInner<'a>,
}

pub enum SegmentDecoderInner<'a> {
    SliceList(SliceListDocListDecoder),
    DictInline(DictInlineDocListDecoder),
    RealTime(RealTimeDocListDecoder<'a>),
}

impl<'a> BufferedSegmentDecoder<'a> {
    pub fn open(segment_posting: &SegmentPosting<'a>) -> Result<Self> {
        Ok(Self {
            base_docid: segment_posting.base_docid(),
            inner_decoder: SegmentDecoderInner::open(segment_posting)?,
        })
    }

    pub fn decode_doc_buffer(
        &mut self,
        docid: DocId,
        doc_list_block: &mut DocListBlock,
    ) -> io::Result<bool> {
        let docid = if docid > self.base_docid {
            docid - self.base_docid
        } else {
            0
        };
        let found = match &mut self.inner_decoder {
            SegmentDecoderInner::SliceList(decoder) => {
                decoder.decode_doc_buffer(docid, doc_list_block)?
            }
            SegmentDecoderInner::DictInline(decoder) => {
                decoder.decode_doc_buffer(docid, doc_list_block)?
            }
            SegmentDecoderInner::RealTime(decoder) => {
                decoder.decode_doc_buffer(docid, doc_list_block)?
            }
        };
        if found {
            doc_list_block.rebase(self.base_docid);
        }
        Ok(found)
    }

    pub fn decode_tf_buffer(&mut self, doc_list_block: &mut DocListBlock) -> io::Result<()> {
        match &mut self.inner_decoder {
            SegmentDecoderInner::SliceList(decoder) => decoder.decode_tf_buffer(doc_list_block),
            SegmentDecoderInner::DictInline(decoder) => decoder.decode_tf_buffer(doc_list_block),
            SegmentDecoderInner::RealTime(decoder) => decoder.decode_tf_buffer(doc_list_block),
        }
    }

    pub fn decode_doc_payload_buffer(
        &mut self,
        doc_list_block: &mut DocListBlock,
    ) -> io::Result<()> {
        match &mut self.inner_decoder {
            SegmentDecoderInner::SliceList(decoder) => {
                decoder.decode_doc_payload_buffer(doc_list_block)
            }
            SegmentDecoderInner::DictInline(decoder) => {
                decoder.decode_doc_payload_buffer(doc_list_block)
            }
            SegmentDecoderInner::RealTime(decoder) => {
                decoder.decode_doc_payload_buffer(doc_list_block)
            }
        }
    }

    pub fn decode_field_map_buffer(&mut self, doc_list_block: &mut DocListBlock) -> io::Result<()> {
        match &mut self.inner_decoder {
            SegmentDecoderInner::SliceList(decoder) => {
                decoder.decode_field_map_buffer(doc_list_block)
            }
            SegmentDecoderInner::DictInline(decoder) => {
                decoder.decode_field_map_buffer(doc_list_block)
            }
            SegmentDecoderInner::RealTime(decoder) => {
                decoder.decode_field_map_buffer(doc_list_block)
            }
        }
    }

    pub fn position_source(&self) -> Option<PositionSource<'a>> {
        match &self.inner_decoder {
            SegmentDecoderInner::SliceList(decoder) => decoder.position_source().cloned(),
            SegmentDecoderInner::RealTime(decoder) => decoder.position_source(),
            SegmentDecoderInner::DictInline(_) => None,
        }
    }
}

impl<'a> SegmentDecoderInner<'a> {
    pub fn open(segment_posting: &SegmentPosting<'a>) -> Result<Self> {
        let option = segment_posting.option();
        match segment_posting.data() {
            SegmentPostingData::SliceList(slice_list) => Ok(Self::SliceList(
                SliceListDocListDecoder::open(slice_list.clone(), option)?,
            )),
            SegmentPostingData::DictInline(value) => Ok(Self::DictInline(
                DictInlineDocListDecoder::open(*value, option)?,
            )),
            SegmentPostingData::RealTime(posting_writer) => {
                Ok(Self::RealTime(RealTimeDocListDecoder::open(posting_writer)))
            }
        }
    }
}
