use std::io::{self, Read};

use crate::TotalTermFreq;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipListEntry {
    /// Local doc id of the last doc of the record.
    pub last_docid: u32,
    /// Offset in the doc list just past the record.
    pub end_offset: u32,
    /// Total term freq through the record, zero without a tf list.
    pub ttf: TotalTermFreq,
}

impl SkipListEntry {
    pub fn encoded_len(has_tflist: bool) -> usize {
        if has_tflist {
            16
        } else {
            8
        }
    }

    pub fn write_to(&self, has_tflist: bool, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.last_docid.to_le_bytes());
        buf.extend_from_slice(&self.end_offset.to_le_bytes());
        if has_tflist {
            buf.extend_from_slice(&(self.ttf as u64).to_le_bytes());
        }
    }
}

/// One entry per doc list record, searched forward only.
#[derive(Default)]
pub struct SkipListReader {
    entries: Vec<SkipListEntry>,
}

impl SkipListReader {
    pub fn load<R: Read>(reader: &mut R, size: usize, has_tflist: bool) -> io::Result<Self> {
        let entry_len = SkipListEntry::encoded_len(has_tflist);
        if size % entry_len != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("skip list size {} is not a multiple of {}", size, entry_len),
            ));
        }
        let mut buf = vec![0u8; size];
        reader.read_exact(&mut buf)?;
        let entries = buf
            .chunks_exact(entry_len)
            .map(|chunk| SkipListEntry {
                last_docid: u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
                end_offset: u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
                ttf: if has_tflist {
                    let mut ttf = [0u8; 8];
                    ttf.copy_from_slice(&chunk[8..16]);
                    u64::from_le_bytes(ttf) as TotalTermFreq
                } else {
                    0
                },
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, record: usize) -> &SkipListEntry {
        &self.entries[record]
    }

    /// First record at or after `from` whose last doc is `>= docid`.
    pub fn seek(&self, from: usize, docid: u32) -> Option<usize> {
        (from..self.entries.len()).find(|&record| self.entries[record].last_docid >= docid)
    }
}
