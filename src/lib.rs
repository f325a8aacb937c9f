pub mod error;
pub mod frequency;
pub mod header;
pub mod huffman;
pub mod pipeline;
pub mod render;
pub mod rw_stream;
pub mod tree_codec;

pub use error::CodecError;
pub use huffman::{CodeTable, HuffmanTree, Node, NodeId};
pub use pipeline::{build_tree, compress, decompress, Compressor, Decompressor};
