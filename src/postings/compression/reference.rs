use std::io::{self, Read, Write};

/// Encodes an ascending `u32` array as `base` plus fixed-width offsets so
/// that any element can be read, and the array binary-searched, without
/// decoding its neighbours.
pub struct ReferenceCompressIntEncoder;

impl ReferenceCompressIntEncoder {
    pub fn encode<W: Write>(&self, values: &[u32], writer: &mut W) -> io::Result<usize> {
        let base = values.first().copied().unwrap_or(0);
        let max_delta = values.last().map_or(0, |&last| last - base);
        let width = value_width(max_delta);
        writer.write_all(&base.to_le_bytes())?;
        writer.write_all(&[width as u8])?;
        for &v in values {
            writer.write_all(&(v - base).to_le_bytes()[..width])?;
        }
        Ok(5 + values.len() * width)
    }
}

fn value_width(max_delta: u32) -> usize {
    if max_delta <= u8::MAX as u32 {
        1
    } else if max_delta <= u16::MAX as u32 {
        2
    } else {
        4
    }
}

#[derive(Default)]
pub struct ReferenceCompressIntReader {
    base: u32,
    width: usize,
    len: usize,
    cursor: usize,
    data: Vec<u8>,
}

impl ReferenceCompressIntReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one encoded array of `len` values, copying its bytes into the
    /// reader's own buffer.
    pub fn load<R: Read>(&mut self, reader: &mut R, len: usize) -> io::Result<()> {
        let mut header = [0u8; 5];
        reader.read_exact(&mut header)?;
        let width = header[4] as usize;
        if !matches!(width, 1 | 2 | 4) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid reference compress width {}", width),
            ));
        }
        self.base = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        self.width = width;
        self.len = len;
        self.cursor = 0;
        self.data.resize(len * width, 0);
        reader.read_exact(&mut self.data[..len * width])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn get(&self, index: usize) -> u32 {
        debug_assert!(index < self.len);
        let start = index * self.width;
        let bytes = &self.data[start..start + self.width];
        let delta = match self.width {
            1 => bytes[0] as u32,
            2 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
            _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        };
        self.base + delta
    }

    pub fn last(&self) -> Option<u32> {
        if self.len == 0 {
            None
        } else {
            Some(self.get(self.len - 1))
        }
    }

    /// Binary-searches, from the cursor on, the first value `>= target` and
    /// moves the cursor there.
    pub fn seek(&mut self, target: u32) -> Option<(usize, u32)> {
        let mut low = self.cursor;
        let mut high = self.len;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.get(mid) < target {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        if low == self.len {
            self.cursor = self.len;
            return None;
        }
        self.cursor = low;
        Some((low, self.get(low)))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{ReferenceCompressIntEncoder, ReferenceCompressIntReader};

    #[test]
    fn test_seek() -> io::Result<()> {
        let values: Vec<u32> = (0..100).map(|i| 1000 + i * 300).collect();
        let mut buf = vec![];
        let written = ReferenceCompressIntEncoder.encode(&values, &mut buf)?;
        assert_eq!(written, buf.len());
        assert_eq!(buf[4], 2);

        let mut reader = ReferenceCompressIntReader::new();
        reader.load(&mut &buf[..], values.len())?;
        assert_eq!(reader.get(7), values[7]);
        assert_eq!(reader.last(), Some(values[99]));

        assert_eq!(reader.seek(0), Some((0, 1000)));
        assert_eq!(reader.seek(1001), Some((1, 1300)));
        assert_eq!(reader.seek(1300), Some((1, 1300)));
        assert_eq!(reader.seek(values[50] - 1), Some((50, values[50])));
        // never moves backwards
        assert_eq!(reader.seek(0), Some((50, values[50])));
        assert_eq!(reader.seek(values[99] + 1), None);

        Ok(())
    }

    #[test]
    fn test_widths() -> io::Result<()> {
        for (values, width) in [
            (vec![5u32, 6, 200], 1u8),
            (vec![0u32, 70000], 4u8),
            (vec![9u32], 1u8),
        ] {
            let mut buf = vec![];
            ReferenceCompressIntEncoder.encode(&values, &mut buf)?;
            assert_eq!(buf[4], width);
            let mut reader = ReferenceCompressIntReader::new();
            reader.load(&mut &buf[..], values.len())?;
            let decoded: Vec<_> = (0..values.len()).map(|i| reader.get(i)).collect();
            assert_eq!(decoded, values);
        }
        Ok(())
    }
}
