use std::io::{self, Read, Write};

/// Base-128 varint codec, low 7 bits first, high bit set while more bytes
/// follow.
pub struct BlockEncoder;

fn invalid_varint() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "varint longer than its type")
}

impl BlockEncoder {
    pub fn write_vu32<W: Write>(&self, value: u32, writer: &mut W) -> io::Result<usize> {
        self.write_vu64(value as u64, writer)
    }

    pub fn write_vu64<W: Write>(&self, value: u64, writer: &mut W) -> io::Result<usize> {
        let mut buf = [0u8; 10];
        let mut len = 0;
        let mut to_encode = value;
        loop {
            let next_byte = (to_encode & 0x7f) as u8;
            to_encode >>= 7;
            if to_encode == 0 {
                buf[len] = next_byte;
                len += 1;
                break;
            }
            buf[len] = next_byte | 0x80;
            len += 1;
        }
        writer.write_all(&buf[..len])?;
        Ok(len)
    }

    pub fn read_vu32<R: Read>(&self, reader: &mut R) -> io::Result<u32> {
        let value = self.read_varint(reader, 5)?;
        u32::try_from(value).map_err(|_| invalid_varint())
    }

    pub fn read_vu64<R: Read>(&self, reader: &mut R) -> io::Result<u64> {
        self.read_varint(reader, 10)
    }

    fn read_varint<R: Read>(&self, reader: &mut R, max_bytes: usize) -> io::Result<u64> {
        let mut result = 0u64;
        let mut buf = [0u8; 1];
        for i in 0..max_bytes {
            reader.read_exact(&mut buf)?;
            let cur_byte = buf[0];
            result |= ((cur_byte & 0x7f) as u64) << (7 * i);
            if cur_byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(invalid_varint())
    }

    pub fn encode_u32<W: Write>(&self, input: &[u32], writer: &mut W) -> io::Result<usize> {
        let mut bytes_written = 0;
        for &v in input {
            bytes_written += self.write_vu32(v, writer)?;
        }
        Ok(bytes_written)
    }

    pub fn decode_u32<R: Read>(&self, reader: &mut R, output_arr: &mut [u32]) -> io::Result<()> {
        for output_mut in output_arr.iter_mut() {
            *output_mut = self.read_vu32(reader)?;
        }
        Ok(())
    }

    pub fn encode_u16<W: Write>(&self, input: &[u16], writer: &mut W) -> io::Result<usize> {
        for &v in input {
            writer.write_all(&v.to_le_bytes())?;
        }
        Ok(input.len() * 2)
    }

    pub fn decode_u16<R: Read>(&self, reader: &mut R, output_arr: &mut [u16]) -> io::Result<()> {
        let mut buf = [0u8; 2];
        for output_mut in output_arr.iter_mut() {
            reader.read_exact(&mut buf)?;
            *output_mut = u16::from_le_bytes(buf);
        }
        Ok(())
    }

    pub fn encode_u8<W: Write>(&self, input: &[u8], writer: &mut W) -> io::Result<usize> {
        writer.write_all(input)?;
        Ok(input.len())
    }

    pub fn decode_u8<R: Read>(&self, reader: &mut R, output_arr: &mut [u8]) -> io::Result<()> {
        reader.read_exact(output_arr)
    }
}
