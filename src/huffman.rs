use std::{cmp::Reverse, collections::BinaryHeap, fmt};

use crate::{frequency::FrequencyTable, rw_stream::bits_to_string};

pub type Code = Vec<bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        left: NodeId,
        right: NodeId,
        weight: u64,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((*left, *right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// Nodes live in one arena; parents refer to children by [`NodeId`].
#[derive(Clone, Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    /// `None` only for an empty table.
    pub fn build(table: &FrequencyTable) -> Option<Self> {
        let mut nodes = Vec::new();
        let mut heap = BinaryHeap::new();

        // Arena index doubles as insertion order: leaves by ascending symbol,
        // then combined nodes as they are created. It breaks weight ties.
        for (symbol, weight) in table.entries() {
            let id = NodeId(nodes.len());
            nodes.push(Node::Leaf { symbol, weight });
            heap.push(Reverse((weight, id)));
        }

        while heap.len() > 1 {
            let Reverse((left_weight, left)) = heap.pop()?;
            let Reverse((right_weight, right)) = heap.pop()?;

            let weight = left_weight + right_weight;
            let id = NodeId(nodes.len());
            nodes.push(Node::Internal {
                left,
                right,
                weight,
            });
            heap.push(Reverse((weight, id)));
        }

        let Reverse((_, root)) = heap.pop()?;
        Some(Self { nodes, root })
    }

    pub(crate) fn from_nodes(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub(crate) fn next_id(nodes: &[Node]) -> NodeId {
        NodeId(nodes.len())
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    pub fn is_single_leaf(&self) -> bool {
        self.root_node().is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.preorder().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            match self.node(id) {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((*right, depth + 1));
                    stack.push((*left, depth + 1));
                }
            }
        }
        deepest
    }

    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }
}

pub struct Preorder<'a> {
    tree: &'a HuffmanTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        if let Some((left, right)) = node.children() {
            self.stack.push(right);
            self.stack.push(left);
        }
        Some((id, node))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; 256];
        let mut path = Vec::new();
        assign_codes(tree, tree.root(), &mut path, &mut codes);
        Self { codes }
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    pub fn entries(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u8, code)))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total body bits needed to encode `table` with these codes.
    pub fn encoded_bits(&self, table: &FrequencyTable) -> u64 {
        table
            .entries()
            .filter_map(|(symbol, count)| self.get(symbol).map(|code| code.len() as u64 * count))
            .sum()
    }
}

fn assign_codes(tree: &HuffmanTree, id: NodeId, path: &mut Code, codes: &mut [Option<Code>]) {
    match tree.node(id) {
        Node::Leaf { symbol, .. } => {
            codes[*symbol as usize] = Some(path.clone());
        }
        Node::Internal { left, right, .. } => {
            path.push(false);
            assign_codes(tree, *left, path, codes);
            path.pop();

            path.push(true);
            assign_codes(tree, *right, path, codes);
            path.pop();
        }
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in self.entries() {
            writeln!(f, "\t{symbol}\t{}", bits_to_string(code))?;
        }
        Ok(())
    }
}
