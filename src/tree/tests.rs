use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    bitstreams::{BitReader, BitWriter},
    error::HuffmanError,
    frequency::FrequencyTable,
};

use super::HuffmanTree;

fn table(pairs: &[(u8, u64)]) -> FrequencyTable {
    let mut freqs = FrequencyTable::new();
    for &(s, c) in pairs {
        freqs.set(s, c);
    }
    freqs
}

/// Cost of an optimal prefix code: the sum of the weights of all merges.
fn optimal_cost(freqs: &FrequencyTable) -> u64 {
    let mut heap: BinaryHeap<Reverse<u64>> = freqs.iter().map(|(_, c)| Reverse(c)).collect();
    if heap.len() == 1 {
        return freqs.total();
    }

    let mut cost = 0;
    while heap.len() > 1 {
        let Reverse(a) = heap.pop().unwrap();
        let Reverse(b) = heap.pop().unwrap();
        cost += a + b;
        heap.push(Reverse(a + b));
    }
    cost
}

fn round_trip(tree: &HuffmanTree, message: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new(Vec::new());
    for &b in message {
        tree.encode(b, &mut writer).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let mut reader = BitReader::new(bytes.as_slice());
    message.iter().map(|_| tree.decode(&mut reader).unwrap()).collect()
}

#[test]
fn test_two_symbols() {
    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"aaab"));

    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.node_count(), 3);
    assert!(tree.code_len(b'a').unwrap() <= tree.code_len(b'b').unwrap());
    // The rarer symbol is popped first and takes the `0` branch.
    assert_eq!(tree.code(b'b').unwrap(), vec![0]);
    assert_eq!(tree.code(b'a').unwrap(), vec![1]);
    assert_eq!(round_trip(&tree, b"aaab"), b"aaab");
}

#[test]
fn test_ties_prefer_smaller_symbol() {
    let tree = HuffmanTree::build(&table(&[(b'a', 1), (b'b', 1), (b'c', 1)]));

    assert_eq!(tree.code(b'c').unwrap(), vec![0]);
    assert_eq!(tree.code(b'a').unwrap(), vec![1, 0]);
    assert_eq!(tree.code(b'b').unwrap(), vec![1, 1]);
}

#[test]
fn test_internal_node_ties_as_symbol_zero() {
    // Symbols 1 and 2 merge into a node of count 2, which then wins the tie
    // against the leaf of symbol 3.
    let tree = HuffmanTree::build(&table(&[(1, 1), (2, 1), (3, 2)]));

    assert_eq!(tree.code(1).unwrap(), vec![0, 0]);
    assert_eq!(tree.code(2).unwrap(), vec![0, 1]);
    assert_eq!(tree.code(3).unwrap(), vec![1]);
}

#[test]
fn test_symbol_zero_leaf_beats_internal_node() {
    // The leaf of symbol 0 is older than the merged node and wins the tie.
    let tree = HuffmanTree::build(&table(&[(0, 2), (5, 1), (6, 1)]));

    assert_eq!(tree.code(0).unwrap(), vec![0]);
    assert_eq!(tree.code(5).unwrap(), vec![1, 0]);
    assert_eq!(tree.code(6).unwrap(), vec![1, 1]);
}

#[test]
fn test_same_table_same_tree() {
    let freqs = FrequencyTable::from_bytes(b"abracadabra, said the magician");
    let first = HuffmanTree::build(&freqs);
    let second = HuffmanTree::build(&freqs);

    for s in 0..=u8::MAX {
        assert_eq!(first.code(s), second.code(s));
    }
}

#[test]
fn test_single_symbol() {
    let tree = HuffmanTree::build(&table(&[(b'z', 10)]));

    assert!(tree.is_single_leaf());
    assert!(tree.is_strict());
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.code(b'z').unwrap(), vec![0]);
    assert_eq!(tree.code_len(b'z'), Some(1));
    assert_eq!(tree.weighted_path_length(), 10);

    let mut writer = BitWriter::new(Vec::new());
    for _ in 0..10 {
        assert_eq!(tree.encode(b'z', &mut writer).unwrap(), 1);
    }
    assert_eq!(writer.written_bits(), 10);
    assert_eq!(writer.into_inner().unwrap(), vec![0, 0]);

    assert_eq!(round_trip(&tree, b"zzzzzzzzzz"), b"zzzzzzzzzz");
}

#[test]
fn test_single_symbol_rejects_one_bit() {
    let tree = HuffmanTree::build(&table(&[(b'z', 1)]));
    let data = [0b1000_0000u8];
    let mut reader = BitReader::new(&data[..]);

    assert!(matches!(
        tree.decode(&mut reader),
        Err(HuffmanError::InvalidCode { bits_read: 1 })
    ));
}

#[test]
fn test_empty_table() {
    let tree = HuffmanTree::build(&FrequencyTable::new());

    assert_eq!(tree.root(), None);
    assert_eq!(tree.leaf_count(), 0);
    assert!(tree.is_strict());
    assert_eq!(tree.weighted_path_length(), 0);

    let mut writer = BitWriter::new(Vec::new());
    assert!(matches!(
        tree.encode(0, &mut writer),
        Err(HuffmanError::UnknownSymbol(0))
    ));

    let mut reader = BitReader::new(&[0u8][..]);
    assert!(matches!(tree.decode(&mut reader), Err(HuffmanError::EmptyTree)));
}

#[test]
fn test_unknown_symbol() {
    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"abc"));
    let mut writer = BitWriter::new(Vec::new());

    assert!(matches!(
        tree.encode(b'd', &mut writer),
        Err(HuffmanError::UnknownSymbol(b'd'))
    ));
    assert_eq!(writer.written_bits(), 0);
}

#[test]
fn test_whole_alphabet_is_strict_and_optimal() {
    let mut freqs = FrequencyTable::new();
    for s in 0..=u8::MAX {
        freqs.set(s, (s as u64 * 7919) % 101 + 1);
    }
    let tree = HuffmanTree::build(&freqs);

    assert!(tree.is_strict());
    assert_eq!(tree.leaf_count(), 256);
    assert_eq!(tree.node_count(), 511);
    assert_eq!(tree.weighted_path_length(), optimal_cost(&freqs));
    assert_eq!(tree.frequencies(), freqs);
}

#[test]
fn test_uniform_alphabet_has_eight_bit_codes() {
    let freqs: FrequencyTable = (0..=u8::MAX).collect();
    let tree = HuffmanTree::build(&freqs);

    assert!((0..=u8::MAX).all(|s| tree.code_len(s) == Some(8)));
}

#[test]
fn test_codes_are_prefix_free() {
    let freqs = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog");
    let tree = HuffmanTree::build(&freqs);
    let codes: Vec<Vec<u8>> = freqs.iter().map(|(s, _)| tree.code(s).unwrap()).collect();

    for (i, a) in codes.iter().enumerate() {
        for (j, b) in codes.iter().enumerate() {
            if i != j {
                assert!(!b.starts_with(a), "{:?} is a prefix of {:?}", a, b);
            }
        }
    }
}

#[test]
fn test_fibonacci_counts_build_a_deep_chain() {
    let mut freqs = FrequencyTable::new();
    let (mut a, mut b) = (1u64, 1u64);
    for s in 0..40u8 {
        freqs.set(s, a);
        (a, b) = (b, a + b);
    }
    let tree = HuffmanTree::build(&freqs);

    assert!(tree.is_strict());
    assert_eq!(tree.code_len(0), Some(39));
    assert_eq!(tree.code_len(39), Some(1));
    assert_eq!(tree.weighted_path_length(), optimal_cost(&freqs));

    let message: Vec<u8> = (0..40u8).rev().collect();
    assert_eq!(round_trip(&tree, &message), message);
}

#[test]
fn test_round_trip_text() {
    let message = b"she sells sea shells by the sea shore";
    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(message));

    assert_eq!(round_trip(&tree, message), message.to_vec());
}

#[test]
fn test_code_book_matches_tree() {
    let text = b"a code book is built once per message";
    let tree = HuffmanTree::build(&FrequencyTable::from_bytes(text));
    let book = tree.code_book();

    for s in 0..=u8::MAX {
        assert_eq!(book.code(s), tree.code(s).as_deref());
    }

    let mut by_tree = BitWriter::new(Vec::new());
    let mut by_book = BitWriter::new(Vec::new());
    for &b in text {
        let len = tree.encode(b, &mut by_tree).unwrap();
        assert_eq!(book.encode(b, &mut by_book).unwrap(), len);
    }
    assert_eq!(by_tree.into_inner().unwrap(), by_book.into_inner().unwrap());

    assert!(matches!(
        book.encode(b'z', &mut BitWriter::new(Vec::new())),
        Err(HuffmanError::UnknownSymbol(b'z'))
    ));
}

#[test]
fn test_code_book_single_symbol() {
    let book = HuffmanTree::build(&FrequencyTable::from_bytes(b"qqq")).code_book();

    assert_eq!(book.code(b'q'), Some(&[0u8][..]));
    assert_eq!(book.code(b'r'), None);
}
