use crate::{
    error::{CodecError, Result},
    huffman::{HuffmanTree, Node, NodeId},
    rw_stream::{BitPacker, BitUnpacker},
};

const LEAF: bool = true;
const INTERNAL: bool = false;

// 256 distinct leaves can sit at most 255 edges below the root.
const MAX_DEPTH: usize = 255;

/// Preorder: `1` + 8-bit symbol for a leaf, `0` + left + right otherwise.
pub fn serialize(tree: &HuffmanTree, packer: &mut BitPacker) -> Result<()> {
    for (_, node) in tree.preorder() {
        match node {
            Node::Leaf { symbol, .. } => {
                packer.pack_bit(LEAF)?;
                packer.pack_u8(*symbol)?;
            }
            Node::Internal { .. } => packer.pack_bit(INTERNAL)?,
        }
    }
    Ok(())
}

/// Weights of the rebuilt tree are zero; only shape and symbols survive.
pub fn deserialize(unpacker: &mut BitUnpacker) -> Result<HuffmanTree> {
    let mut nodes = Vec::new();
    let mut seen = [false; 256];
    let root = read_node(unpacker, &mut nodes, &mut seen, 0).map_err(|e| match e {
        CodecError::Exhausted => CodecError::TruncatedTree,
        e => e,
    })?;
    Ok(HuffmanTree::from_nodes(nodes, root))
}

fn read_node(
    unpacker: &mut BitUnpacker,
    nodes: &mut Vec<Node>,
    seen: &mut [bool; 256],
    depth: usize,
) -> Result<NodeId> {
    if depth > MAX_DEPTH {
        return Err(CodecError::InvalidTree("tree too deep"));
    }

    let node = if unpacker.read_bit()? == LEAF {
        let symbol = unpacker.read_u8()?;
        if seen[symbol as usize] {
            return Err(CodecError::InvalidTree("duplicate leaf"));
        }
        seen[symbol as usize] = true;
        Node::Leaf { symbol, weight: 0 }
    } else {
        let left = read_node(unpacker, nodes, seen, depth + 1)?;
        let right = read_node(unpacker, nodes, seen, depth + 1)?;
        Node::Internal {
            left,
            right,
            weight: 0,
        }
    };

    let id = HuffmanTree::next_id(nodes);
    nodes.push(node);
    Ok(id)
}
