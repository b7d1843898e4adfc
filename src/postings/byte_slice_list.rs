use std::{
    io::{self, Read, Seek, SeekFrom},
    sync::Arc,
};

use crate::store::{FileReader, MemFile};

/// Size of the blocks a slice list fetches from its backing file.
pub const BYTE_SLICE_SIZE: usize = 4096;

/// Handle to the bytes of one posting inside a posting file.
///
/// The bytes are fetched lazily, one fixed-size slice at a time, so reading
/// may perform I/O and fail. Cloning only bumps the file's reference count.
#[derive(Clone)]
pub struct ByteSliceList {
    file: Arc<dyn FileReader>,
    offset: usize,
    total_size: usize,
}

pub struct ByteSliceReader {
    global_offset: usize,
    slice_index: Option<usize>,
    slice_len: usize,
    slice: Box<[u8]>,
    byte_slice_list: ByteSliceList,
}

impl ByteSliceList {
    pub fn open(file: Arc<dyn FileReader>, offset: usize, total_size: usize) -> Self {
        Self {
            file,
            offset,
            total_size,
        }
    }

    /// Everything from `offset` to the end of the file.
    pub fn open_to_end(file: Arc<dyn FileReader>, offset: usize) -> Self {
        let total_size = file.len().saturating_sub(offset);
        Self::open(file, offset, total_size)
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        let total_size = data.len();
        Self::open(Arc::new(MemFile::new(data)), 0, total_size)
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// The `size` bytes starting at `offset` of this list.
    pub fn sub_list(&self, offset: usize, size: usize) -> io::Result<Self> {
        if offset + size > self.total_size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "sub list [{}, {}) out of byte slice list of size {}",
                    offset,
                    offset + size,
                    self.total_size
                ),
            ));
        }
        Ok(Self::open(self.file.clone(), self.offset + offset, size))
    }

    pub fn slice_count(&self) -> usize {
        (self.total_size + BYTE_SLICE_SIZE - 1) / BYTE_SLICE_SIZE
    }

    fn read_slice(&self, slice_index: usize, buf: &mut [u8]) -> io::Result<usize> {
        let start = slice_index * BYTE_SLICE_SIZE;
        let len = std::cmp::min(BYTE_SLICE_SIZE, self.total_size - start);
        self.file.read_exact_at(self.offset + start, &mut buf[..len])?;
        Ok(len)
    }
}

impl ByteSliceReader {
    pub fn open(byte_slice_list: ByteSliceList) -> Self {
        Self {
            global_offset: 0,
            slice_index: None,
            slice_len: 0,
            slice: vec![0; BYTE_SLICE_SIZE].into_boxed_slice(),
            byte_slice_list,
        }
    }

    pub fn tell(&self) -> usize {
        self.global_offset
    }

    pub fn total_size(&self) -> usize {
        self.byte_slice_list.total_size()
    }

    pub fn remain_size(&self) -> usize {
        self.total_size() - self.global_offset
    }

    pub fn eof(&self) -> bool {
        self.global_offset == self.total_size()
    }

    pub fn byte_slice_list(&self) -> &ByteSliceList {
        &self.byte_slice_list
    }

    fn load_current_slice(&mut self) -> io::Result<()> {
        let slice_index = self.global_offset / BYTE_SLICE_SIZE;
        if self.slice_index != Some(slice_index) {
            self.slice_index = None;
            self.slice_len = self
                .byte_slice_list
                .read_slice(slice_index, &mut self.slice)?;
            self.slice_index = Some(slice_index);
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

impl Read for ByteSliceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.eof() || buf.is_empty() {
            return Ok(0);
        }
        self.load_current_slice()?;
        let offset_in_slice = self.global_offset % BYTE_SLICE_SIZE;
        let size = std::cmp::min(buf.len(), self.slice_len - offset_in_slice);
        buf[..size].copy_from_slice(&self.slice[offset_in_slice..offset_in_slice + size]);
        self.global_offset += size;
        Ok(size)
    }
}

impl Seek for ByteSliceReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.global_offset as i64 + delta,
            SeekFrom::End(delta) => self.total_size() as i64 + delta,
        };
        if target < 0 || target as usize > self.total_size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "seek to {} out of byte slice list of size {}",
                    target,
                    self.total_size()
                ),
            ));
        }
        self.global_offset = target as usize;
        Ok(self.global_offset as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read, Seek, SeekFrom};

    use super::{ByteSliceList, ByteSliceReader, BYTE_SLICE_SIZE};

    #[test]
    fn test_read_across_slices() -> io::Result<()> {
        let data: Vec<u8> = (0..BYTE_SLICE_SIZE * 2 + 10).map(|i| (i % 251) as u8).collect();
        let byte_slice_list = ByteSliceList::from_bytes(data.clone());
        assert_eq!(byte_slice_list.slice_count(), 3);

        let mut reader = ByteSliceReader::open(byte_slice_list.clone());
        let mut buf = vec![];
        reader.read_to_end(&mut buf)?;
        assert_eq!(buf, data);
        assert!(reader.eof());

        reader.seek(SeekFrom::Start((BYTE_SLICE_SIZE - 2) as u64))?;
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        assert_eq!(&buf[..], &data[BYTE_SLICE_SIZE - 2..BYTE_SLICE_SIZE + 2]);
        assert_eq!(reader.tell(), BYTE_SLICE_SIZE + 2);

        reader.seek(SeekFrom::Current(-4))?;
        assert_eq!(reader.read_u8()?, data[BYTE_SLICE_SIZE - 2]);
        assert!(reader.seek(SeekFrom::End(1)).is_err());

        Ok(())
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = ByteSliceReader::open(ByteSliceList::from_bytes(vec![1, 2, 3]));
        let mut buf = [0u8; 4];
        let err = reader.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
