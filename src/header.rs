use binary_rw::{BinaryReader, BinaryWriter, Endian, MemoryStream, SliceStream};

use crate::error::{CodecError, Result};

/// `original_length` is a big-endian u64 at the front of every artifact.
pub const LENGTH_BYTES: usize = 8;
pub const LENGTH_BITS: usize = LENGTH_BYTES * 8;

pub fn write_length(length: usize) -> Result<Vec<u8>> {
    let length = u64::try_from(length).map_err(|_| CodecError::InputTooLarge(length))?;

    let mut stream = MemoryStream::new();
    {
        let mut writer = BinaryWriter::new(&mut stream, Endian::Big);
        writer
            .write_u64(length)
            .map_err(|e| CodecError::Header(e.to_string()))?;
    }

    Ok(stream.into())
}

pub fn read_length(data: &[u8]) -> Result<u64> {
    if data.len() < LENGTH_BYTES {
        return Err(CodecError::TruncatedHeader);
    }

    let mut stream = SliceStream::new(data);
    let mut reader = BinaryReader::new(&mut stream, Endian::Big);
    reader
        .read_u64()
        .map_err(|e| CodecError::Header(e.to_string()))
}
