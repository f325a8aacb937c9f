use crate::{
    error::{CodecError, Result},
    frequency::FrequencyTable,
    header::{read_length, write_length, LENGTH_BITS},
    huffman::{CodeTable, HuffmanTree, Node},
    rw_stream::{BitPacker, BitUnpacker},
    tree_codec,
};

macro_rules! log {
    ($log:expr, $($arg:tt)*) => {
        ($log)(format!($($arg)*));
    };
}

pub struct Compressor<F> {
    log: F,
}

pub struct Decompressor<F> {
    log: F,
}

impl<F> Compressor<F> {
    pub fn new(log: F) -> Self {
        Self { log }
    }
}

impl<F> Decompressor<F> {
    pub fn new(log: F) -> Self {
        Self { log }
    }
}

impl<F: Fn(String)> Compressor<F> {
    pub fn compress<T: AsRef<[u8]>>(&self, data: T) -> Result<Vec<u8>> {
        let data = data.as_ref();
        let header = write_length(data.len())?;

        let table = FrequencyTable::count(data);
        let tree = match HuffmanTree::build(&table) {
            None => {
                log!(self.log, "Empty input, writing length only");
                return Ok(header);
            }
            Some(tree) => tree,
        };
        let codes = CodeTable::from_tree(&tree);

        log!(
            self.log,
            "Input: {} bytes, {} distinct symbols, tree depth {}",
            data.len(),
            table.distinct(),
            tree.depth()
        );
        log!(self.log, "Code table:\n{}", codes.to_string().trim_end());

        let mut packer = BitPacker::with_buffer(header);
        tree_codec::serialize(&tree, &mut packer)?;
        let tree_bits = packer.bits_written();

        // A lone leaf has an empty code; the length alone says how many to emit.
        if !tree.is_single_leaf() {
            for &byte in data {
                let code = codes
                    .get(byte)
                    .ok_or(CodecError::InvalidTree("symbol missing from code table"))?;
                packer.pack(code)?;
            }
        }
        let body_bits = packer.bits_written() - tree_bits;

        let output = packer.finish()?;
        log!(
            self.log,
            "Tree: {tree_bits} bits, body: {body_bits} bits, artifact: {} bytes ({:.1}% of input)",
            output.len(),
            100.0 * output.len() as f64 / data.len() as f64
        );

        Ok(output)
    }
}

impl<F: Fn(String)> Decompressor<F> {
    pub fn decompress<T: AsRef<[u8]>>(&self, artifact: T) -> Result<Vec<u8>> {
        let artifact = artifact.as_ref();
        let expected = read_length(artifact)?;
        if expected == 0 {
            log!(self.log, "Declared length 0");
            return Ok(Vec::new());
        }
        let length = usize::try_from(expected).map_err(|_| CodecError::LengthTooLarge(expected))?;

        let mut unpacker = BitUnpacker::new(artifact, LENGTH_BITS)?;
        let tree = tree_codec::deserialize(&mut unpacker)?;
        log!(
            self.log,
            "Declared length {length}, tree with {} leaves ends at bit {}",
            tree.leaf_count(),
            unpacker.position()
        );

        if let Node::Leaf { symbol, .. } = tree.root_node() {
            let mut output = Vec::new();
            output
                .try_reserve_exact(length)
                .map_err(|_| CodecError::LengthTooLarge(expected))?;
            output.resize(length, *symbol);
            return Ok(output);
        }

        // Every code is at least one bit, so the body bounds the output size.
        let mut output = Vec::with_capacity(length.min(unpacker.remaining()));
        while output.len() < length {
            let mut id = tree.root();
            loop {
                match tree.node(id) {
                    Node::Leaf { symbol, .. } => {
                        output.push(*symbol);
                        break;
                    }
                    Node::Internal { left, right, .. } => {
                        let bit = unpacker.read_bit().map_err(|e| match e {
                            CodecError::Exhausted => CodecError::TruncatedBody {
                                expected,
                                decoded: output.len() as u64,
                            },
                            e => e,
                        })?;
                        id = if bit { *right } else { *left };
                    }
                }
            }
        }

        log!(
            self.log,
            "Decoded {length} bytes, {} pad bits ignored",
            unpacker.remaining()
        );
        Ok(output)
    }
}

pub fn compress<T: AsRef<[u8]>>(data: T) -> Result<Vec<u8>> {
    Compressor::new(|_| {}).compress(data)
}

pub fn decompress<T: AsRef<[u8]>>(artifact: T) -> Result<Vec<u8>> {
    Decompressor::new(|_| {}).decompress(artifact)
}

/// `None` for empty input, which has no tree.
pub fn build_tree<T: AsRef<[u8]>>(data: T) -> Option<HuffmanTree> {
    HuffmanTree::build(&FrequencyTable::count(data))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::header::LENGTH_BYTES;

    fn round_trip(data: &[u8]) -> Vec<u8> {
        let artifact = compress(data).unwrap();
        assert_eq!(decompress(&artifact).unwrap(), data);
        artifact
    }

    fn noise(len: usize, seed: u32) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (state >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn test_round_trip_empty() {
        let artifact = round_trip(b"");
        assert_eq!(artifact, vec![0; LENGTH_BYTES]);
    }

    #[test]
    fn test_round_trip_single_byte() {
        let artifact = round_trip(b"x");
        // length + 9 tree bits
        assert_eq!(artifact.len(), LENGTH_BYTES + 2);
    }

    #[test]
    fn test_round_trip_identical_bytes() {
        let data = vec![0xAA; 10_000];
        let artifact = round_trip(&data);
        // length + 9 tree bits, no body
        assert_eq!(artifact.len(), LENGTH_BYTES + 2);
        assert_eq!(&artifact[..LENGTH_BYTES], &10_000u64.to_be_bytes());
    }

    #[test]
    fn test_round_trip_all_symbols() {
        let data = (0..=255u8).collect::<Vec<_>>();
        round_trip(&data);

        let mut data = (0..=255u8).rev().collect::<Vec<_>>();
        data.extend(0..=255u8);
        round_trip(&data);
    }

    #[test]
    fn test_round_trip_text() {
        round_trip(b"ab");
        round_trip(b"abracadabra");
        round_trip(b"The quick brown fox jumps over the lazy dog.\n".repeat(50).as_slice());
    }

    #[test]
    fn test_round_trip_noise() {
        for (len, seed) in [(1, 1), (7, 2), (100, 3), (4096, 4), (65_537, 5)] {
            round_trip(&noise(len, seed));
        }
    }

    #[test]
    fn test_round_trip_skewed() {
        let data = noise(20_000, 9)
            .into_iter()
            .map(|b| b.leading_zeros() as u8)
            .collect::<Vec<_>>();
        let artifact = round_trip(&data);
        assert!(artifact.len() < data.len() / 2);
    }

    #[test]
    fn test_scenario_aaab() {
        let artifact = round_trip(b"aaab");
        assert_eq!(&artifact[..LENGTH_BYTES], &4u64.to_be_bytes());

        // tree 0 1'b' 1'a' (19 bits) then body 1 1 1 0 (4 bits), padded to 3 bytes
        assert_eq!(artifact.len(), LENGTH_BYTES + 3);
        assert_eq!(
            &artifact[LENGTH_BYTES..],
            &[0b0101_1000, 0b1010_1100, 0b0011_1100]
        );
    }

    #[test]
    fn test_deterministic() {
        let data = noise(5000, 42);
        let first = compress(&data).unwrap();
        for _ in 0..5 {
            assert_eq!(compress(&data).unwrap(), first);
        }
    }

    #[test]
    fn test_truncated_body() {
        for data in [b"aaab".to_vec(), b"abracadabra".to_vec(), noise(1000, 7)] {
            let artifact = compress(&data).unwrap();
            let result = decompress(&artifact[..artifact.len() - 1]);
            assert!(result.unwrap_err().is_malformed());
        }

        let data = noise(1000, 8);
        let artifact = compress(&data).unwrap();
        match decompress(&artifact[..artifact.len() - 1]) {
            Err(CodecError::TruncatedBody { expected, decoded }) => {
                assert_eq!(expected, 1000);
                assert!(decoded < 1000);
            }
            other => panic!("expected truncated body, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_tree() {
        let artifact = compress(b"abracadabra").unwrap();
        assert!(matches!(
            decompress(&artifact[..LENGTH_BYTES + 2]),
            Err(CodecError::TruncatedTree)
        ));
        assert!(matches!(
            decompress(&artifact[..LENGTH_BYTES]),
            Err(CodecError::TruncatedTree)
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(decompress(b""), Err(CodecError::TruncatedHeader)));
        assert!(matches!(
            decompress([0u8, 0, 0, 0, 0]),
            Err(CodecError::TruncatedHeader)
        ));
    }

    #[test]
    fn test_declared_length_too_long() {
        let mut artifact = compress(b"abracadabra").unwrap();
        artifact[..LENGTH_BYTES].copy_from_slice(&1_000_000u64.to_be_bytes());
        assert!(matches!(
            decompress(&artifact),
            Err(CodecError::TruncatedBody {
                expected: 1_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_declared_length_unallocatable() {
        let mut artifact = compress(b"zz").unwrap();
        artifact[..LENGTH_BYTES].copy_from_slice(&u64::MAX.to_be_bytes());
        assert!(matches!(
            decompress(&artifact),
            Err(CodecError::LengthTooLarge(u64::MAX))
        ));
    }

    #[test]
    fn test_trailing_pad_ignored() {
        let mut artifact = compress(b"abcabcabd").unwrap();
        artifact.push(0xFF);
        assert_eq!(decompress(&artifact).unwrap(), b"abcabcabd");
    }

    #[test]
    fn test_build_tree() {
        assert!(build_tree(b"").is_none());
        let tree = build_tree(b"hello").unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.root_node().weight(), 5);
    }

    #[test]
    fn test_logging() {
        let messages = RefCell::new(Vec::new());
        let log = |msg: String| messages.borrow_mut().push(msg);

        let artifact = Compressor::new(log).compress(b"aaab").unwrap();
        Decompressor::new(log).decompress(&artifact).unwrap();

        let messages = messages.into_inner();
        assert!(messages.iter().any(|m| m.contains("2 distinct symbols")));
        assert!(messages.iter().any(|m| m.contains("body: 4 bits")));
        assert!(messages.iter().any(|m| m.contains("Decoded 4 bytes")));
    }
}
