//! Error types for compression and decompression.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Result type alias for the codec.
pub type Result<T> = core::result::Result<T, HuffmanError>;

#[derive(Debug, Error)]
pub enum HuffmanError {
    /// The input file does not exist or cannot be read.
    #[error("cannot read input {}: {source}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file cannot be created or written.
    #[error("cannot write output {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error from the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read ran past the end of the container.
    #[error("unexpected end of container after {bits_read} bits")]
    UnexpectedEof { bits_read: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The frequency of a symbol needs more than 31 bits.
    #[error("frequency {count} of symbol {symbol:#04x} does not fit in 31 bits")]
    FrequencyTooLarge { symbol: u8, count: u64 },

    #[error("invalid code in payload at bit {bits_read}")]
    InvalidCode { bits_read: usize },

    /// Non-zero padding or extra bytes after the last decoded symbol.
    #[error("{bits} unexpected trailing bits after the payload")]
    TrailingData { bits: usize },

    #[error("symbol {0:#04x} is not part of the tree")]
    UnknownSymbol(u8),

    #[error("the tree is empty")]
    EmptyTree,

    /// A properties sidecar is malformed or disagrees with its container.
    #[error("invalid properties: {0}")]
    InvalidProperties(String),
}

impl HuffmanError {
    pub fn invalid_header(message: impl Into<String>) -> Self {
        HuffmanError::InvalidHeader(message.into())
    }

    /// True for errors caused by a malformed container rather than by I/O.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            HuffmanError::UnexpectedEof { .. }
                | HuffmanError::InvalidHeader(_)
                | HuffmanError::InvalidCode { .. }
                | HuffmanError::TrailingData { .. }
        )
    }
}
