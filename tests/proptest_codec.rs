//! Property-based tests for the Huffman container.
//!
//! These tests check that the codec properties hold across a wide range of inputs:
//! - decompressing a container restores the input exactly
//! - compressing twice yields identical containers
//! - the tree built for any table is strict and optimal

use std::{cmp::Reverse, collections::BinaryHeap};

use proptest::prelude::*;

use hctree_rust::{
    compress, compress_with_stats, decompress, read_header, FrequencyTable, HuffmanTree,
};

/// Inputs over a small alphabet, so that symbols repeat.
fn narrow_input_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..8, 0..2048)
}

fn any_input_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}

fn frequency_table_strategy() -> impl Strategy<Value = FrequencyTable> {
    prop::collection::vec((any::<u8>(), 1u64..10_000), 1..64).prop_map(|pairs| {
        let mut freqs = FrequencyTable::new();
        for (s, c) in pairs {
            freqs.set(s, c);
        }
        freqs
    })
}

fn optimal_cost(freqs: &FrequencyTable) -> u64 {
    let mut heap: BinaryHeap<Reverse<u64>> = freqs.iter().map(|(_, c)| Reverse(c)).collect();
    if heap.len() == 1 {
        return freqs.total();
    }

    let mut cost = 0;
    while let (Some(Reverse(a)), Some(Reverse(b))) = (heap.pop(), heap.pop()) {
        cost += a + b;
        heap.push(Reverse(a + b));
    }
    cost
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    })]

    /// Property: decompress(compress(s)) == s.
    #[test]
    fn prop_round_trip(input in any_input_strategy()) {
        let container = compress(&input).unwrap();
        prop_assert_eq!(decompress(&container).unwrap(), input);
    }

    #[test]
    fn prop_round_trip_narrow(input in narrow_input_strategy()) {
        let container = compress(&input).unwrap();
        prop_assert_eq!(decompress(&container).unwrap(), input);
    }

    /// Property: a run of one byte round-trips with one payload bit per byte.
    #[test]
    fn prop_single_symbol(symbol in any::<u8>(), len in 1usize..5000) {
        let input = vec![symbol; len];
        let (container, stats) = compress_with_stats(&input).unwrap();

        prop_assert_eq!(stats.payload_bits, len);
        prop_assert_eq!(decompress(&container).unwrap(), input);
    }

    #[test]
    fn prop_deterministic(input in any_input_strategy()) {
        prop_assert_eq!(compress(&input).unwrap(), compress(&input).unwrap());
    }

    /// Property: the header frequencies add up to the decoded length.
    #[test]
    fn prop_header_consistent(input in narrow_input_strategy()) {
        let container = compress(&input).unwrap();
        let total = read_header(&container).unwrap().map_or(0, |h| h.total_symbols());

        prop_assert_eq!(total, decompress(&container).unwrap().len() as u64);
    }

    /// Property: the tree is strict, has one leaf per symbol and minimal weighted path length.
    #[test]
    fn prop_tree_optimal(freqs in frequency_table_strategy()) {
        let tree = HuffmanTree::build(&freqs);

        prop_assert!(tree.is_strict());
        prop_assert_eq!(tree.leaf_count(), freqs.unique_symbols());
        prop_assert_eq!(tree.weighted_path_length(), optimal_cost(&freqs));
    }
}
