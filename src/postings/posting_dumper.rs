use std::io::{self, Write};

use tantivy_common::CountingWriter;

use crate::{TotalTermFreq, MAX_DOC_PER_RECORD, POSITION_SKIP_INTERVAL};

use super::{
    compression::{BlockEncoder, ReferenceCompressIntEncoder},
    skip_list::SkipListEntry,
    CompressMode, PostingFormatOption, PostingWriter, TermMetaDumper,
};

/// Writes a building posting in its on-disk layout.
pub struct PostingDumper {
    option: PostingFormatOption,
}

impl PostingDumper {
    pub fn new(option: PostingFormatOption) -> Self {
        Self { option }
    }

    pub fn compress_mode(&self) -> CompressMode {
        if self.option.is_reference_compressed() {
            CompressMode::REFERENCE
        } else {
            CompressMode::NORMAL
        }
    }

    /// Returns the number of bytes written.
    pub fn dump<W: Write>(&self, posting: &PostingWriter, output: &mut W) -> io::Result<usize> {
        let mut writer = CountingWriter::wrap(output);
        let block_encoder = BlockEncoder;

        let (skip_list, doc_list) = self.encode_doc_list(posting)?;
        TermMetaDumper::new(self.option).dump(&posting.term_meta(), &mut writer)?;
        block_encoder.write_vu32(skip_list.len() as u32, &mut writer)?;
        block_encoder.write_vu32(doc_list.len() as u32, &mut writer)?;
        writer.write_all(&skip_list)?;
        writer.write_all(&doc_list)?;

        if self.option.has_position_list() {
            let (pos_skip_list, pos_list) = self.encode_position_list(posting)?;
            block_encoder.write_vu32(pos_skip_list.len() as u32, &mut writer)?;
            block_encoder.write_vu32(pos_list.len() as u32, &mut writer)?;
            writer.write_all(&pos_skip_list)?;
            writer.write_all(&pos_list)?;
        }

        Ok(writer.written_bytes() as usize)
    }

    fn encode_doc_list(&self, posting: &PostingWriter) -> io::Result<(Vec<u8>, Vec<u8>)> {
        let block_encoder = BlockEncoder;
        let has_tflist = self.option.has_tflist();
        let docids = posting.docids();
        let record_count = posting.record_count();

        let mut skip_list = vec![];
        let mut doc_list = vec![];
        let mut last_docid = 0;
        let mut ttf: TotalTermFreq = 0;
        for start in (0..docids.len()).step_by(MAX_DOC_PER_RECORD) {
            let end = std::cmp::min(start + MAX_DOC_PER_RECORD, docids.len());
            if self.option.is_reference_compressed() {
                let values: Vec<u32> = docids[start..end].iter().map(|&d| d as u32).collect();
                ReferenceCompressIntEncoder.encode(&values, &mut doc_list)?;
            } else {
                for &docid in &docids[start..end] {
                    block_encoder.write_vu32((docid - last_docid) as u32, &mut doc_list)?;
                    last_docid = docid;
                }
            }
            last_docid = docids[end - 1];

            let term_freqs = &posting.term_freqs()[start..end];
            if has_tflist {
                block_encoder.encode_u32(term_freqs, &mut doc_list)?;
            }
            if self.option.has_doc_payload() {
                block_encoder.encode_u16(&posting.doc_payloads()[start..end], &mut doc_list)?;
            }
            if self.option.has_fieldmap() {
                block_encoder.encode_u8(&posting.field_maps()[start..end], &mut doc_list)?;
            }

            ttf += term_freqs.iter().map(|&tf| tf as TotalTermFreq).sum::<TotalTermFreq>();
            if record_count > 1 {
                SkipListEntry {
                    last_docid: last_docid as u32,
                    end_offset: doc_list.len() as u32,
                    ttf: if has_tflist { ttf } else { 0 },
                }
                .write_to(has_tflist, &mut skip_list);
            }
        }

        Ok((skip_list, doc_list))
    }

    fn encode_position_list(&self, posting: &PostingWriter) -> io::Result<(Vec<u8>, Vec<u8>)> {
        let block_encoder = BlockEncoder;
        let positions = posting.positions();
        let mut skip_list = vec![];
        let mut pos_list = vec![];
        let mut index = 0;
        for &tf in posting.term_freqs() {
            let mut last_pos = 0u32;
            for &pos in &positions[index..index + tf as usize] {
                if index > 0 && index % POSITION_SKIP_INTERVAL == 0 {
                    skip_list.extend_from_slice(&(pos_list.len() as u32).to_le_bytes());
                }
                block_encoder.write_vu32(pos.wrapping_sub(last_pos), &mut pos_list)?;
                last_pos = pos;
                index += 1;
            }
        }
        Ok((skip_list, pos_list))
    }
}
