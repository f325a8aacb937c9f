use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::error::{CodecError, Result};

type ReadCursor<'a> = Cursor<&'a [u8]>;

/// Accumulates bits most-significant-bit first into an in-memory buffer.
pub struct BitPacker {
    writer: BitWriter<Vec<u8>, BigEndian>,
    bits_written: usize,
}

/// Reads bits back in the order [`BitPacker`] wrote them.
pub struct BitUnpacker<'a> {
    reader: BitReader<ReadCursor<'a>, BigEndian>,
    position: usize,
    len: usize,
}

impl BitPacker {
    pub fn new() -> Self {
        Self::with_buffer(Vec::new())
    }

    /// Packs after whatever whole bytes `buffer` already holds.
    pub fn with_buffer(buffer: Vec<u8>) -> Self {
        Self {
            writer: BitWriter::endian(buffer, BigEndian),
            bits_written: 0,
        }
    }

    pub fn bits_written(&self) -> usize {
        self.bits_written
    }

    pub fn pack_bit(&mut self, bit: bool) -> Result<()> {
        self.writer.write_bit(bit)?;
        self.bits_written += 1;
        Ok(())
    }

    pub fn pack(&mut self, bits: &[bool]) -> Result<()> {
        for &bit in bits {
            self.writer.write_bit(bit)?;
        }
        self.bits_written += bits.len();
        Ok(())
    }

    pub fn pack_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write::<u8>(8, value)?;
        self.bits_written += 8;
        Ok(())
    }

    /// Zero-pads the trailing partial byte and hands back the buffer.
    /// Consuming `self` rules out packing after the stream is closed.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.writer.byte_align()?;
        Ok(self.writer.into_writer())
    }
}

impl Default for BitPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> BitUnpacker<'a> {
    pub fn new(data: &'a [u8], bit_offset: usize) -> Result<Self> {
        let len = data.len() * 8;
        if bit_offset > len {
            return Err(CodecError::Exhausted);
        }

        let cursor = Cursor::new(&data[bit_offset / 8..]);
        let mut reader = BitReader::endian(cursor, BigEndian);
        let skip = (bit_offset % 8) as u32;
        if skip > 0 {
            reader.skip(skip)?;
        }

        Ok(Self {
            reader,
            position: bit_offset,
            len,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.len - self.position
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.remaining() == 0 {
            return Err(CodecError::Exhausted);
        }
        let bit = self.reader.read_bit()?;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_bits(&mut self, count: usize) -> Result<Vec<bool>> {
        if count > self.remaining() {
            return Err(CodecError::Exhausted);
        }
        (0..count).map(|_| self.read_bit()).collect()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        if self.remaining() < 8 {
            return Err(CodecError::Exhausted);
        }
        let value = self.reader.read::<u8>(8)?;
        self.position += 8;
        Ok(value)
    }
}

pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}
