use std::fmt::Write;

use crate::huffman::{HuffmanTree, Node, NodeId};

/// Graphviz source for `tree`; left edges are labelled 0, right edges 1.
pub fn to_dot(tree: &HuffmanTree) -> String {
    let mut output = String::from("digraph G {\n");

    for (id, node) in tree.preorder() {
        if let Some((left, right)) = node.children() {
            writeln!(output, "\t{} -> {} [label=\"0\"];", name(id), name(left)).ok();
            writeln!(output, "\t{} -> {} [label=\"1\"];", name(id), name(right)).ok();
        }
        writeln!(output, "\t{} [label=\"{}\"];", name(id), label(node)).ok();
    }

    output.push_str("}\n");
    output
}

fn name(id: NodeId) -> String {
    format!("n{}", id.index())
}

fn label(node: &Node) -> String {
    let weight = format!("(n={})", node.weight());
    match node.symbol() {
        None => weight,
        Some(symbol) => format!("{weight}\\n{}", symbol_label(symbol)),
    }
}

fn symbol_label(symbol: u8) -> String {
    match symbol {
        b'"' => "\\\"".to_string(),
        b'\\' => "\\\\".to_string(),
        b' ' => "' '".to_string(),
        _ if symbol.is_ascii_graphic() => (symbol as char).to_string(),
        _ => format!("0x{symbol:02X}"),
    }
}
