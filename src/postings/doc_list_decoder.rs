use std::io::{self, Seek, SeekFrom};

use crate::{DocId, TotalTermFreq, MAX_DOC_PER_RECORD};

use super::{
    compression::BlockEncoder, skip_list::SkipListReader, ByteSliceList, ByteSliceReader,
    CompressMode, DictInlineFormatter, DictInlinePosting, DocListBlock, PositionSource,
    PostingFormatOption, PostingHeader, PostingWriter,
};

/// Record-at-a-time decoding of the doc list of one segment. Doc ids seen
/// here are local to the segment.
pub trait DocListDecode {
    /// Decodes the first record, at or after the current one, that holds a
    /// doc `>= docid`. Returns false once no such record remains.
    fn decode_doc_buffer(&mut self, docid: DocId, block: &mut DocListBlock) -> io::Result<bool>;

    fn decode_tf_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()>;

    fn decode_doc_payload_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()>;

    fn decode_field_map_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()>;
}

fn record_count(doc_freq: usize) -> usize {
    (doc_freq + MAX_DOC_PER_RECORD - 1) / MAX_DOC_PER_RECORD
}

fn record_len(doc_freq: usize, record: usize) -> usize {
    std::cmp::min(MAX_DOC_PER_RECORD, doc_freq - record * MAX_DOC_PER_RECORD)
}

/// Decodes a dumped posting read through a byte slice list.
pub struct SliceListDocListDecoder {
    option: PostingFormatOption,
    doc_freq: usize,
    record_count: usize,
    next_record: usize,
    reader: ByteSliceReader,
    doc_list_offset: usize,
    skip_list: SkipListReader,
    tf_offset: usize,
    doc_payload_offset: usize,
    field_map_offset: usize,
    position_source: Option<PositionSource<'static>>,
}

impl SliceListDocListDecoder {
    /// `option` must already reflect the posting's compress mode.
    pub fn open(posting: ByteSliceList, option: PostingFormatOption) -> io::Result<Self> {
        let mut reader = ByteSliceReader::open(posting.clone());
        let header = PostingHeader::load_from_reader(&mut reader, option)?;
        reader.seek(SeekFrom::Start(header.doc_skip_list_offset as u64))?;
        let skip_list = SkipListReader::load(
            &mut reader,
            header.info.doc_skip_list_size,
            option.has_tflist(),
        )?;

        let doc_freq = std::cmp::max(header.term_meta.doc_freq, 0) as usize;
        let record_count = record_count(doc_freq);
        if record_count > 1 && skip_list.len() != record_count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} skip list entries for {} records",
                    skip_list.len(),
                    record_count
                ),
            ));
        }
        let position_source = if option.has_position_list() {
            Some(PositionSource::load_slice_list(&posting, &header)?)
        } else {
            None
        };

        Ok(Self {
            option,
            doc_freq,
            record_count,
            next_record: 0,
            reader,
            doc_list_offset: header.doc_list_offset,
            skip_list,
            tf_offset: 0,
            doc_payload_offset: 0,
            field_map_offset: 0,
            position_source,
        })
    }

    pub fn position_source(&self) -> Option<&PositionSource<'static>> {
        self.position_source.as_ref()
    }

    fn seek_section(&mut self, offset: usize) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(offset as u64))?;
        Ok(())
    }
}

impl DocListDecode for SliceListDocListDecoder {
    fn decode_doc_buffer(&mut self, docid: DocId, block: &mut DocListBlock) -> io::Result<bool> {
        loop {
            if self.next_record >= self.record_count {
                return Ok(false);
            }
            let mut record = self.next_record;
            if !self.skip_list.is_empty() {
                match self.skip_list.seek(record, std::cmp::max(docid, 0) as u32) {
                    Some(found) => record = found,
                    None => {
                        self.next_record = self.record_count;
                        return Ok(false);
                    }
                }
            }

            let (start_offset, base_docid, base_ttf) = if record == 0 {
                (0, 0, 0)
            } else {
                let entry = self.skip_list.entry(record - 1);
                (
                    entry.end_offset as usize,
                    entry.last_docid as DocId,
                    entry.ttf,
                )
            };
            self.seek_section(self.doc_list_offset + start_offset)?;

            let len = record_len(self.doc_freq, record);
            block.reset_record(len);
            block.option = self.option;
            block.base_docid = base_docid;
            block.base_ttf = base_ttf;
            if self.option.is_reference_compressed() {
                block.reference.load(&mut self.reader, len)?;
                block.last_docid = block.reference.last().unwrap_or(0) as DocId;
            } else {
                BlockEncoder.decode_u32(&mut self.reader, &mut block.doc_deltas[..len])?;
                block.last_docid = base_docid + block.delta_sum();
            }
            self.tf_offset = self.reader.tell();
            self.doc_payload_offset = self.tf_offset;
            self.field_map_offset = self.tf_offset;
            self.next_record = record + 1;

            if block.last_docid >= docid {
                return Ok(true);
            }
        }
    }

    fn decode_tf_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        if self.option.has_tflist() {
            self.seek_section(self.tf_offset)?;
            BlockEncoder.decode_u32(&mut self.reader, &mut block.term_freqs[..block.len])?;
            self.doc_payload_offset = self.reader.tell();
            self.field_map_offset = self.doc_payload_offset;
        } else {
            block.term_freqs[..block.len].fill(1);
        }
        block.tf_decoded = true;
        Ok(())
    }

    fn decode_doc_payload_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        if !block.tf_decoded {
            self.decode_tf_buffer(block)?;
        }
        if self.option.has_doc_payload() {
            self.seek_section(self.doc_payload_offset)?;
            BlockEncoder.decode_u16(&mut self.reader, &mut block.doc_payloads[..block.len])?;
            self.field_map_offset = self.reader.tell();
        } else {
            block.doc_payloads[..block.len].fill(0);
        }
        block.doc_payload_decoded = true;
        Ok(())
    }

    fn decode_field_map_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        if !block.doc_payload_decoded {
            self.decode_doc_payload_buffer(block)?;
        }
        if self.option.has_fieldmap() {
            self.seek_section(self.field_map_offset)?;
            BlockEncoder.decode_u8(&mut self.reader, &mut block.field_maps[..block.len])?;
        } else {
            block.field_maps[..block.len].fill(0);
        }
        block.field_map_decoded = true;
        Ok(())
    }
}

/// Expands a dict-inline value into records of consecutive doc ids.
pub struct DictInlineDocListDecoder {
    option: PostingFormatOption,
    posting: DictInlinePosting,
    record_count: usize,
    next_record: usize,
}

impl DictInlineDocListDecoder {
    pub fn open(dict_value: u64, option: PostingFormatOption) -> io::Result<Self> {
        let option = option.with_compress_mode(CompressMode::DICT_INLINE);
        let posting = DictInlineFormatter::new(option).decode(dict_value)?;
        Ok(Self {
            option,
            posting,
            record_count: record_count(posting.doc_freq as usize),
            next_record: 0,
        })
    }
}

impl DocListDecode for DictInlineDocListDecoder {
    fn decode_doc_buffer(&mut self, docid: DocId, block: &mut DocListBlock) -> io::Result<bool> {
        if docid > self.posting.last_docid() {
            self.next_record = self.record_count;
            return Ok(false);
        }
        let mut record = self.next_record;
        if docid > self.posting.docid {
            let target_record = (docid - self.posting.docid) as usize / MAX_DOC_PER_RECORD;
            record = std::cmp::max(record, target_record);
        }
        if record >= self.record_count {
            self.next_record = self.record_count;
            return Ok(false);
        }

        let len = record_len(self.posting.doc_freq as usize, record);
        let first_docid = self.posting.docid + (record * MAX_DOC_PER_RECORD) as DocId;
        block.reset_record(len);
        block.option = self.option;
        block.base_docid = if record == 0 { 0 } else { first_docid - 1 };
        block.last_docid = first_docid + len as DocId - 1;
        block.base_ttf =
            (record * MAX_DOC_PER_RECORD) as TotalTermFreq * self.posting.term_freq as TotalTermFreq;
        block.doc_deltas[0] = (first_docid - block.base_docid) as u32;
        block.doc_deltas[1..len].fill(1);
        block.term_freqs[..len].fill(self.posting.term_freq);
        block.doc_payloads[..len].fill(self.posting.doc_payload);
        block.field_maps[..len].fill(self.posting.field_map);
        block.tf_decoded = true;
        block.doc_payload_decoded = true;
        block.field_map_decoded = true;
        self.next_record = record + 1;

        Ok(true)
    }

    fn decode_tf_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.tf_decoded = true;
        Ok(())
    }

    fn decode_doc_payload_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.doc_payload_decoded = true;
        Ok(())
    }

    fn decode_field_map_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.field_map_decoded = true;
        Ok(())
    }
}

/// Reads a building segment's posting writer record by record.
pub struct RealTimeDocListDecoder<'a> {
    option: PostingFormatOption,
    posting: &'a PostingWriter,
    record_count: usize,
    next_record: usize,
}

impl<'a> RealTimeDocListDecoder<'a> {
    pub fn open(posting: &'a PostingWriter) -> Self {
        Self {
            option: posting.option().with_compress_mode(CompressMode::NORMAL),
            posting,
            record_count: posting.record_count(),
            next_record: 0,
        }
    }

    pub fn position_source(&self) -> Option<PositionSource<'a>> {
        if self.option.has_position_list() {
            Some(PositionSource::RealTime(self.posting.positions()))
        } else {
            None
        }
    }
}

impl<'a> DocListDecode for RealTimeDocListDecoder<'a> {
    fn decode_doc_buffer(&mut self, docid: DocId, block: &mut DocListBlock) -> io::Result<bool> {
        let docids = self.posting.docids();
        let first_hit = docids.partition_point(|&d| d < docid);
        let record = std::cmp::max(self.next_record, first_hit / MAX_DOC_PER_RECORD);
        if first_hit == docids.len() || record >= self.record_count {
            self.next_record = self.record_count;
            return Ok(false);
        }

        let start = record * MAX_DOC_PER_RECORD;
        let end = std::cmp::min(start + MAX_DOC_PER_RECORD, docids.len());
        let len = end - start;
        block.reset_record(len);
        block.option = self.option;
        block.base_docid = if record == 0 { 0 } else { docids[start - 1] };
        block.last_docid = docids[end - 1];
        block.base_ttf = self.posting.ttf_before_record(record);
        let mut last_docid = block.base_docid;
        for (delta, &docid) in block.doc_deltas[..len].iter_mut().zip(&docids[start..end]) {
            *delta = (docid - last_docid) as u32;
            last_docid = docid;
        }
        if self.option.has_tflist() {
            block.term_freqs[..len].copy_from_slice(&self.posting.term_freqs()[start..end]);
        } else {
            block.term_freqs[..len].fill(1);
        }
        block.doc_payloads[..len].copy_from_slice(&self.posting.doc_payloads()[start..end]);
        block.field_maps[..len].copy_from_slice(&self.posting.field_maps()[start..end]);
        block.tf_decoded = true;
        block.doc_payload_decoded = true;
        block.field_map_decoded = true;
        self.next_record = record + 1;

        Ok(true)
    }

    fn decode_tf_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.tf_decoded = true;
        Ok(())
    }

    fn decode_doc_payload_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.doc_payload_decoded = true;
        Ok(())
    }

    fn decode_field_map_buffer(&mut self, block: &mut DocListBlock) -> io::Result<()> {
        block.field_map_decoded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::{
        postings::{
            compose_dict_value, ByteSliceList, CompressMode, DictInlineFormatter,
            DictInlinePosting, DocListBlock, PostingDumper, PostingFormatOption, PostingWriter,
        },
        MAX_DOC_PER_RECORD,
    };

    use super::{
        DictInlineDocListDecoder, DocListDecode, RealTimeDocListDecoder, SliceListDocListDecoder,
    };

    fn build_writer(option: PostingFormatOption, doc_count: usize) -> PostingWriter {
        let mut writer = PostingWriter::new(option);
        for i in 0..doc_count {
            for _ in 0..(i % 3 + 1) {
                writer.add_pos(0, i % 2);
            }
            writer.end_doc(i as i32 * 3, i as u16);
        }
        writer
    }

    fn collect_docids(
        decoder: &mut dyn DocListDecode,
        block: &mut DocListBlock,
    ) -> io::Result<Vec<i32>> {
        let mut docids = vec![];
        let mut target = 0;
        while decoder.decode_doc_buffer(target, block)? {
            if block.option.is_reference_compressed() {
                docids.extend((0..block.len).map(|i| block.reference.get(i) as i32));
            } else {
                let mut docid = block.base_docid;
                for &delta in &block.doc_deltas[..block.len] {
                    docid += delta as i32;
                    docids.push(docid);
                }
            }
            target = block.last_docid + 1;
        }
        Ok(docids)
    }

    #[test]
    fn test_slice_list_decoder() -> io::Result<()> {
        for compress_mode in [CompressMode::NORMAL, CompressMode::REFERENCE] {
            let option = PostingFormatOption::builder()
                .with_tflist()
                .with_doc_payload()
                .with_fieldmap()
                .build()
                .with_compress_mode(compress_mode);
            let writer = build_writer(option, MAX_DOC_PER_RECORD * 2 + 5);
            let mut buf = vec![];
            PostingDumper::new(option).dump(&writer, &mut buf)?;

            let mut block = DocListBlock::default();
            let mut decoder = SliceListDocListDecoder::open(ByteSliceList::from_bytes(buf), option)?;
            assert_eq!(collect_docids(&mut decoder, &mut block)?, writer.docids());

            let mut buf = vec![];
            PostingDumper::new(option).dump(&writer, &mut buf)?;
            let mut decoder = SliceListDocListDecoder::open(ByteSliceList::from_bytes(buf), option)?;
            // skips straight to the second record
            let target = writer.docids()[MAX_DOC_PER_RECORD + 1];
            assert!(decoder.decode_doc_buffer(target, &mut block)?);
            assert_eq!(block.last_docid, writer.docids()[MAX_DOC_PER_RECORD * 2 - 1]);
            let expected_ttf: i64 = writer.term_freqs()[..MAX_DOC_PER_RECORD]
                .iter()
                .map(|&tf| tf as i64)
                .sum();
            assert_eq!(block.base_ttf, expected_ttf);

            decoder.decode_field_map_buffer(&mut block)?;
            assert!(block.tf_decoded && block.doc_payload_decoded);
            let start = MAX_DOC_PER_RECORD;
            assert_eq!(&block.term_freqs[..3], &writer.term_freqs()[start..start + 3]);
            assert_eq!(&block.doc_payloads[..3], &writer.doc_payloads()[start..start + 3]);
            assert_eq!(&block.field_maps[..3], &writer.field_maps()[start..start + 3]);

            assert!(!decoder.decode_doc_buffer(i32::MAX, &mut block)?);
        }
        Ok(())
    }

    #[test]
    fn test_dict_inline_decoder() -> io::Result<()> {
        let option = PostingFormatOption::builder().with_tflist().build();
        let posting = DictInlinePosting {
            docid: 10,
            term_freq: 2,
            doc_freq: (MAX_DOC_PER_RECORD + 2) as i32,
            ..Default::default()
        };
        let value = DictInlineFormatter::new(option).try_encode(&posting).unwrap();
        let dict_value = compose_dict_value(CompressMode::DICT_INLINE, value);
        let mut decoder = DictInlineDocListDecoder::open(dict_value & ((1 << 56) - 1), option)?;
        let mut block = DocListBlock::default();
        let docids = collect_docids(&mut decoder, &mut block)?;
        let expected: Vec<i32> = (10..10 + MAX_DOC_PER_RECORD as i32 + 2).collect();
        assert_eq!(docids, expected);
        assert_eq!(block.base_ttf, MAX_DOC_PER_RECORD as i64 * 2);
        Ok(())
    }

    #[test]
    fn test_dict_inline_decoder_past_last_doc() -> io::Result<()> {
        let option = PostingFormatOption::builder().with_tflist().build();
        let posting = DictInlinePosting {
            docid: 3,
            term_freq: 1,
            doc_freq: 3,
            ..Default::default()
        };
        let value = DictInlineFormatter::new(option).try_encode(&posting).unwrap();
        let mut block = DocListBlock::default();

        let mut decoder = DictInlineDocListDecoder::open(value, option)?;
        assert!(!decoder.decode_doc_buffer(7, &mut block)?);
        assert!(!decoder.decode_doc_buffer(0, &mut block)?);

        let mut decoder = DictInlineDocListDecoder::open(value, option)?;
        assert!(decoder.decode_doc_buffer(5, &mut block)?);
        assert_eq!(block.last_docid, 5);
        assert!(!decoder.decode_doc_buffer(6, &mut block)?);
        Ok(())
    }

    #[test]
    fn test_realtime_decoder() -> io::Result<()> {
        let option = PostingFormatOption::builder().with_tflist().build();
        let writer = build_writer(option, MAX_DOC_PER_RECORD + 1);
        let mut decoder = RealTimeDocListDecoder::open(&writer);
        let mut block = DocListBlock::default();
        assert_eq!(collect_docids(&mut decoder, &mut block)?, writer.docids());

        let mut decoder = RealTimeDocListDecoder::open(&writer);
        assert!(decoder.decode_doc_buffer(writer.docids()[MAX_DOC_PER_RECORD], &mut block)?);
        assert_eq!(block.len, 1);
        assert_eq!(block.base_ttf, writer.ttf_before_record(1));
        assert!(!decoder.decode_doc_buffer(i32::MAX, &mut block)?);
        Ok(())
    }
}
