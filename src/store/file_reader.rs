use std::io;

use tantivy_common::OwnedBytes;

/// Positional read access to one index file.
pub trait FileReader: Send + Sync {
    fn len(&self) -> usize;

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> io::Result<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_exact_at(&self, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let mut done = 0;
        while done < buf.len() {
            let n = self.read_at(offset + done, &mut buf[done..])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "read {} bytes at offset {} past file end {}",
                        buf.len(),
                        offset,
                        self.len()
                    ),
                ));
            }
            done += n;
        }
        Ok(())
    }
}

/// A file held entirely in memory.
#[derive(Clone)]
pub struct MemFile {
    data: OwnedBytes,
}

impl MemFile {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: OwnedBytes::new(data),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl FileReader for MemFile {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.as_slice();
        if offset >= data.len() {
            return Ok(0);
        }
        let size = std::cmp::min(buf.len(), data.len() - offset);
        buf[..size].copy_from_slice(&data[offset..offset + size]);
        Ok(size)
    }
}
