use std::{
    io::{self, Seek, SeekFrom},
    sync::Arc,
};

use crate::{DocId, Pos, TermFreq, TotalTermFreq, INVALID_DOCID, INVALID_POSITION, POSITION_SKIP_INTERVAL};

use super::{
    compression::BlockEncoder, ByteSliceList, ByteSliceReader, PostingHeader, SectionAttributeReader,
    SectionMeta,
};

/// Where the positions of one segment's posting live.
#[derive(Clone)]
pub enum PositionSource<'a> {
    SliceList {
        pos_list: ByteSliceList,
        skip_offsets: Arc<[u32]>,
    },
    RealTime(&'a [Pos]),
}

impl<'a> PositionSource<'a> {
    pub fn load_slice_list(posting: &ByteSliceList, header: &PostingHeader) -> io::Result<Self> {
        let skip_list = posting.sub_list(header.pos_skip_list_offset, header.info.pos_skip_list_size)?;
        let mut reader = ByteSliceReader::open(skip_list);
        let mut skip_offsets = Vec::with_capacity(header.info.pos_skip_list_size / 4);
        while !reader.eof() {
            skip_offsets.push(reader.read_u32_le()?);
        }
        Ok(Self::SliceList {
            pos_list: posting.sub_list(header.pos_list_offset, header.info.pos_list_size)?,
            skip_offsets: skip_offsets.into(),
        })
    }

    /// Decodes the `tf` positions of the doc whose first position is the
    /// `ttf`-th position of the segment.
    pub fn read_doc_positions(
        &self,
        ttf: TotalTermFreq,
        tf: TermFreq,
        positions: &mut Vec<Pos>,
    ) -> io::Result<()> {
        positions.clear();
        let start = ttf as usize;
        match self {
            Self::SliceList {
                pos_list,
                skip_offsets,
            } => {
                let block = start / POSITION_SKIP_INTERVAL;
                let block_offset = if block == 0 {
                    0
                } else {
                    *skip_offsets.get(block - 1).ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("position {} beyond position skip list", start),
                        )
                    })? as usize
                };
                let mut reader = ByteSliceReader::open(pos_list.clone());
                reader.seek(SeekFrom::Start(block_offset as u64))?;
                let block_encoder = BlockEncoder;
                for _ in block * POSITION_SKIP_INTERVAL..start {
                    block_encoder.read_vu32(&mut reader)?;
                }
                let mut last_pos: Pos = 0;
                for _ in 0..tf {
                    last_pos = last_pos.wrapping_add(block_encoder.read_vu32(&mut reader)?);
                    positions.push(last_pos);
                }
                Ok(())
            }
            Self::RealTime(all_positions) => {
                let end = start + tf as usize;
                if end > all_positions.len() {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("positions [{}, {}) not written yet", start, end),
                    ));
                }
                positions.extend_from_slice(&all_positions[start..end]);
                Ok(())
            }
        }
    }
}

/// What a position iterator needs to find the positions of one doc.
#[derive(Clone)]
pub struct InDocPositionState<'a> {
    pub docid: DocId,
    pub term_freq: TermFreq,
    /// Index of the doc's first position within its segment.
    pub ttf: TotalTermFreq,
    pub source: Option<PositionSource<'a>>,
    pub section_reader: Option<Arc<dyn SectionAttributeReader>>,
}

impl<'a> Default for InDocPositionState<'a> {
    fn default() -> Self {
        Self {
            docid: INVALID_DOCID,
            term_freq: 0,
            ttf: 0,
            source: None,
            section_reader: None,
        }
    }
}

impl<'a> InDocPositionState<'a> {
    pub fn position_iterator(&self) -> InDocPositionIterator<'a> {
        InDocPositionIterator::new(self.clone())
    }
}

/// Walks the positions of a single doc in ascending order.
pub struct InDocPositionIterator<'a> {
    state: InDocPositionState<'a>,
    positions: Vec<Pos>,
    loaded: bool,
    cursor: usize,
    sections: Option<Vec<SectionMeta>>,
}

impl<'a> InDocPositionIterator<'a> {
    pub fn new(state: InDocPositionState<'a>) -> Self {
        Self {
            state,
            positions: vec![],
            loaded: false,
            cursor: 0,
            sections: None,
        }
    }

    pub fn docid(&self) -> DocId {
        self.state.docid
    }

    fn load(&mut self) -> io::Result<()> {
        if !self.loaded {
            if let Some(source) = &self.state.source {
                source.read_doc_positions(self.state.ttf, self.state.term_freq, &mut self.positions)?;
            }
            self.loaded = true;
        }
        Ok(())
    }

    /// First position `>= pos` not yet passed, or `INVALID_POSITION`.
    pub fn seek_position(&mut self, pos: Pos) -> io::Result<Pos> {
        self.load()?;
        while self.cursor < self.positions.len() && self.positions[self.cursor] < pos {
            self.cursor += 1;
        }
        Ok(self.current_position())
    }

    pub fn current_position(&self) -> Pos {
        if self.loaded && self.cursor < self.positions.len() {
            self.positions[self.cursor]
        } else {
            INVALID_POSITION
        }
    }

    /// Section holding the current position, if the doc has section
    /// attributes.
    pub fn section_meta(&mut self) -> io::Result<Option<SectionMeta>> {
        let pos = self.current_position();
        if pos == INVALID_POSITION {
            return Ok(None);
        }
        let Some(section_reader) = &self.state.section_reader else {
            return Ok(None);
        };
        if self.sections.is_none() {
            self.sections = Some(section_reader.read(self.state.docid)?);
        }
        let mut section_end = 0;
        for section in self.sections.iter().flatten() {
            section_end += section.length;
            if pos < section_end {
                return Ok(Some(*section));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use crate::{
        postings::{
            ByteSliceList, InMemorySectionAttributeReader, PostingDumper, PostingFormatOption,
            PostingHeader, PostingWriter, SectionMeta,
        },
        INVALID_POSITION, POSITION_SKIP_INTERVAL,
    };

    use super::{InDocPositionState, PositionSource};

    #[test]
    fn test_read_positions_across_skip_blocks() -> io::Result<()> {
        let option = PostingFormatOption::builder().with_position_list().build();
        let mut writer = PostingWriter::new(option);
        for docid in 0..100 {
            for pos in 0..3 {
                writer.add_pos(docid as u32 + pos * 10, 0);
            }
            writer.end_doc(docid, 0);
        }
        let mut buf = vec![];
        PostingDumper::new(option).dump(&writer, &mut buf)?;
        let list = ByteSliceList::from_bytes(buf);
        let header = PostingHeader::load(&list, option)?;
        let source = PositionSource::load_slice_list(&list, &header)?;

        let mut positions = vec![];
        // doc 50 starts at position 150, in the second skip block
        assert!(150 > POSITION_SKIP_INTERVAL);
        source.read_doc_positions(150, 3, &mut positions)?;
        assert_eq!(positions, vec![50, 60, 70]);

        let realtime = PositionSource::RealTime(writer.positions());
        realtime.read_doc_positions(150, 3, &mut positions)?;
        assert_eq!(positions, vec![50, 60, 70]);
        assert!(realtime.read_doc_positions(299, 3, &mut positions).is_err());
        Ok(())
    }

    #[test]
    fn test_in_doc_position_iterator() -> io::Result<()> {
        let positions = [2, 7, 15];
        let mut section_reader = InMemorySectionAttributeReader::default();
        section_reader.add_doc(
            4,
            vec![
                SectionMeta::new(0, 1, 10),
                SectionMeta::new(1, 1, 10),
            ],
        );
        let state = InDocPositionState {
            docid: 4,
            term_freq: 3,
            ttf: 0,
            source: Some(PositionSource::RealTime(&positions)),
            section_reader: Some(Arc::new(section_reader)),
        };
        let mut iter = state.position_iterator();
        assert_eq!(iter.seek_position(0)?, 2);
        assert_eq!(iter.section_meta()?.map(|s| s.field_id), Some(0));
        assert_eq!(iter.seek_position(8)?, 15);
        assert_eq!(iter.section_meta()?.map(|s| s.field_id), Some(1));
        assert_eq!(iter.seek_position(3)?, 15);
        assert_eq!(iter.seek_position(16)?, INVALID_POSITION);
        assert_eq!(iter.section_meta()?, None);
        Ok(())
    }
}
