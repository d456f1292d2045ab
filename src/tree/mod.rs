use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    io::{Read, Write},
};

use tracing::{debug, trace};

use crate::{
    bitstreams::{BitReader, BitWriter},
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
    NUM_SYMBOLS,
};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Heap key: lower count first, then lower tie symbol, then older node.
type HeapKey = Reverse<(u64, u8, NodeId)>;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum NodeKind {
    Leaf { symbol: u8 },
    /// `children[0]` is reached with a `0` bit, `children[1]` with a `1` bit.
    Internal { children: [NodeId; 2] },
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct TreeNode {
    pub count: u64,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

impl TreeNode {
    fn leaf(symbol: u8, count: u64) -> Self {
        Self {
            count,
            kind: NodeKind::Leaf { symbol },
            parent: None,
        }
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn symbol(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Leaf { symbol } => Some(symbol),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Symbol used to break ties between equal counts. Internal nodes carry
    /// no symbol and compete as symbol 0.
    #[inline(always)]
    fn tie_symbol(&self) -> u8 {
        self.symbol().unwrap_or(0)
    }
}

/// A Huffman coding tree over the byte alphabet.
///
/// Nodes live in an arena and refer to each other by index: internal nodes own
/// their two children, every non-root node keeps the index of its parent, and
/// `leaves` maps each symbol to its leaf. The tree is immutable once built and
/// the same table always yields the same tree.
#[derive(Clone, Debug)]
pub struct HuffmanTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
    leaves: Box<[Option<NodeId>]>,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lowest priority nodes.
    ///
    /// The first node popped becomes the `0` child and the second the `1` child
    /// of the merged node. A table with a single present symbol yields a tree
    /// made of one leaf; an empty table yields a tree without root.
    pub fn build(freqs: &FrequencyTable) -> Self {
        let unique = freqs.unique_symbols();

        let mut nodes = Vec::with_capacity(2 * unique);
        let mut leaves = vec![None; NUM_SYMBOLS].into_boxed_slice();
        let mut heap: BinaryHeap<HeapKey> = BinaryHeap::with_capacity(unique);

        for (symbol, count) in freqs.iter() {
            let id = nodes.len();
            nodes.push(TreeNode::leaf(symbol, count));
            leaves[symbol as usize] = Some(id);
            heap.push(Reverse((count, symbol, id)));
        }

        let mut root = None;

        while let Some(Reverse((first_count, _, first))) = heap.pop() {
            let Some(Reverse((second_count, _, second))) = heap.pop() else {
                root = Some(first);
                break;
            };

            let id = nodes.len();
            let merged = TreeNode {
                count: first_count + second_count,
                kind: NodeKind::Internal {
                    children: [first, second],
                },
                parent: None,
            };
            nodes[first].parent = Some(id);
            nodes[second].parent = Some(id);

            trace!(id, first, second, count = merged.count, "merged nodes");

            heap.push(Reverse((merged.count, merged.tie_symbol(), id)));
            nodes.push(merged);
        }

        debug!(
            leaves = unique,
            nodes = nodes.len(),
            total = root.map(|r: NodeId| nodes[r].count).unwrap_or(0),
            "built huffman tree"
        );

        HuffmanTree {
            nodes,
            root,
            leaves,
        }
    }

    #[inline(always)]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline(always)]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn leaf(&self, symbol: u8) -> Option<NodeId> {
        self.leaves[symbol as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.iter().flatten().count()
    }

    /// True when the root is a lone leaf.
    pub fn is_single_leaf(&self) -> bool {
        self.root.map_or(false, |r| self.nodes[r].is_leaf())
    }

    /// Bits coding `symbol`, from the root down to its leaf.
    ///
    /// The lone leaf of a single-symbol tree is coded as one `0` bit.
    pub fn code(&self, symbol: u8) -> Option<Vec<u8>> {
        let leaf = self.leaf(symbol)?;

        if self.nodes[leaf].parent.is_none() {
            return Some(vec![0]);
        }

        // Collected from the leaf up, hence reversed at the end.
        let mut bits = Vec::new();
        let mut node = leaf;
        while let Some(parent) = self.nodes[node].parent {
            let bit = match self.nodes[parent].kind {
                NodeKind::Internal { children } if children[1] == node => 1,
                _ => 0,
            };
            bits.push(bit);
            node = parent;
        }
        bits.reverse();

        Some(bits)
    }

    /// Length in bits of the code of `symbol`.
    pub fn code_len(&self, symbol: u8) -> Option<usize> {
        let leaf = self.leaf(symbol)?;

        let mut len = 0;
        let mut node = leaf;
        while let Some(parent) = self.nodes[node].parent {
            len += 1;
            node = parent;
        }

        Some(len.max(1))
    }

    /// Writes the code of `symbol` and returns its length.
    ///
    /// Walks the tree on every call; use a [`CodeBook`] to encode whole messages.
    pub fn encode<W: Write>(&self, symbol: u8, writer: &mut BitWriter<W>) -> Result<usize> {
        let code = self
            .code(symbol)
            .ok_or(HuffmanError::UnknownSymbol(symbol))?;

        write_code(&code, writer)
    }

    /// Codes of all present symbols, computed once.
    pub fn code_book(&self) -> CodeBook {
        CodeBook {
            codes: (0..=u8::MAX).map(|s| self.code(s)).collect(),
        }
    }

    /// Reads one code from `reader` and returns its symbol.
    ///
    /// The tree carries no end marker: the caller must stop after as many
    /// symbols as the message holds.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u8> {
        let root = self.root.ok_or(HuffmanError::EmptyTree)?;

        if let NodeKind::Leaf { symbol } = self.nodes[root].kind {
            return match reader.read_bit()? {
                0 => Ok(symbol),
                _ => Err(HuffmanError::InvalidCode {
                    bits_read: reader.read_bits(),
                }),
            };
        }

        let mut node = root;
        loop {
            match self.nodes[node].kind {
                NodeKind::Leaf { symbol } => return Ok(symbol),
                NodeKind::Internal { children } => {
                    node = children[reader.read_bit()? as usize];
                }
            }
        }
    }

    /// Sum over the present symbols of count times code length.
    pub fn weighted_path_length(&self) -> u64 {
        (0..=u8::MAX)
            .filter_map(|s| {
                let leaf = self.leaf(s)?;
                Some(self.nodes[leaf].count * self.code_len(s)? as u64)
            })
            .sum()
    }

    /// Checks that every internal node has two distinct children pointing back
    /// to it, that counts add up, and that every node but the root has a parent.
    pub fn is_strict(&self) -> bool {
        let Some(root) = self.root else {
            return self.nodes.is_empty();
        };

        let mut internal = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            if id != root && node.parent.is_none() {
                return false;
            }
            if let NodeKind::Internal { children: [c0, c1] } = node.kind {
                internal += 1;
                if c0 == c1
                    || self.nodes[c0].parent != Some(id)
                    || self.nodes[c1].parent != Some(id)
                    || self.nodes[c0].count + self.nodes[c1].count != node.count
                {
                    return false;
                }
            }
        }

        self.nodes[root].parent.is_none() && self.leaf_count() == internal + 1
    }

    /// The table the tree was built from.
    pub fn frequencies(&self) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for node in self.nodes.iter() {
            if let NodeKind::Leaf { symbol } = node.kind {
                table.set(symbol, node.count);
            }
        }
        table
    }
}

/// Per-symbol code table of a [`HuffmanTree`], indexed by symbol.
#[derive(Clone, Debug)]
pub struct CodeBook {
    codes: Box<[Option<Vec<u8>>]>,
}

impl CodeBook {
    #[inline(always)]
    pub fn code(&self, symbol: u8) -> Option<&[u8]> {
        self.codes[symbol as usize].as_deref()
    }

    /// Writes the code of `symbol` and returns its length.
    #[inline(always)]
    pub fn encode<W: Write>(&self, symbol: u8, writer: &mut BitWriter<W>) -> Result<usize> {
        let code = self
            .code(symbol)
            .ok_or(HuffmanError::UnknownSymbol(symbol))?;

        write_code(code, writer)
    }
}

fn write_code<W: Write>(code: &[u8], writer: &mut BitWriter<W>) -> Result<usize> {
    for &bit in code {
        writer.write_bit(bit)?;
    }
    Ok(code.len())
}

#[cfg(test)]
mod tests;
