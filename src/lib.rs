//! Lossless byte compression with a Huffman coding tree.
//!
//! A container holds the frequency table of the message followed by the
//! Huffman-coded bits of every byte:
//!
//! ```
//! let container = hctree_rust::compress(b"aaab")?;
//! assert_eq!(hctree_rust::decompress(&container)?, b"aaab");
//! # Ok::<(), hctree_rust::HuffmanError>(())
//! ```

pub mod bitstreams;
pub mod container;
pub mod error;
pub mod frequency;
pub mod properties;
pub mod tree;
pub mod utils;

/// Size of the byte alphabet.
pub const NUM_SYMBOLS: usize = 256;

pub use container::{
    compress, compress_file, compress_with_stats, decompress, decompress_file,
    decompress_file_checked, decompress_with_stats, inspect, read_header, ContainerHeader,
    ContainerStats,
};
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use tree::{CodeBook, HuffmanTree};
