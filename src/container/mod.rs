use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    bitstreams::{BitReader, BitWriter, BUF_BITS},
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
    properties::{sidecar_path, ContainerProperties},
    tree::HuffmanTree,
    NUM_SYMBOLS,
};

/// Width of the unique symbol count field (up to 256 symbols).
pub const UNIQUE_COUNT_BITS: u32 = 9;
/// Width of the field holding the width of each frequency.
pub const FREQ_WIDTH_BITS: u32 = 5;
/// Largest frequency width the 5-bit width field can describe.
pub const MAX_FREQ_BITS: u32 = (1 << FREQ_WIDTH_BITS) - 1;

/// Number of significant bits of `max_freq`, at least one.
pub fn freq_width(max_freq: u64) -> u32 {
    (u64::BITS - max_freq.leading_zeros()).max(1)
}

/// The frequency table as stored in front of the payload.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ContainerHeader {
    pub freq_width: u32,
    /// Present symbols with their counts, in increasing symbol order.
    pub entries: Vec<(u8, u64)>,
}

impl ContainerHeader {
    pub fn from_table(freqs: &FrequencyTable) -> Result<Self> {
        let freq_width = freq_width(freqs.max_frequency());

        if freq_width > MAX_FREQ_BITS {
            if let Some((symbol, count)) = freqs.iter().max_by_key(|&(_, c)| c) {
                return Err(HuffmanError::FrequencyTooLarge { symbol, count });
            }
        }

        Ok(Self {
            freq_width,
            entries: freqs.iter().collect(),
        })
    }

    pub fn unique_symbols(&self) -> usize {
        self.entries.len()
    }

    /// Length of the original message.
    pub fn total_symbols(&self) -> u64 {
        self.entries.iter().map(|&(_, c)| c).sum()
    }

    pub fn bit_len(&self) -> usize {
        (UNIQUE_COUNT_BITS + FREQ_WIDTH_BITS) as usize
            + self.entries.len() * (BUF_BITS + self.freq_width as usize)
    }

    pub fn to_table(&self) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for &(symbol, count) in self.entries.iter() {
            table.set(symbol, count);
        }
        table
    }

    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_int(self.entries.len() as u16, UNIQUE_COUNT_BITS)?;
        writer.write_int(self.freq_width, FREQ_WIDTH_BITS)?;

        for &(symbol, count) in self.entries.iter() {
            writer.write_byte(symbol)?;
            writer.write_int(count, self.freq_width)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let unique: u16 = reader.read_int(UNIQUE_COUNT_BITS)?;
        let freq_width: u32 = reader.read_int(FREQ_WIDTH_BITS)?;

        if unique as usize > NUM_SYMBOLS {
            return Err(HuffmanError::invalid_header(format!(
                "{} unique symbols in a {}-symbol alphabet",
                unique, NUM_SYMBOLS
            )));
        }
        if unique == 0 {
            return Err(HuffmanError::invalid_header("no symbols in a non-empty container"));
        }
        if freq_width == 0 {
            return Err(HuffmanError::invalid_header("zero frequency width"));
        }

        let mut seen = [false; NUM_SYMBOLS];
        let mut entries = Vec::with_capacity(unique as usize);

        for _ in 0..unique {
            let symbol = reader.read_byte()?;
            let count: u64 = reader.read_int(freq_width)?;

            if seen[symbol as usize] {
                return Err(HuffmanError::invalid_header(format!(
                    "symbol {:#04x} listed twice",
                    symbol
                )));
            }
            if count == 0 {
                return Err(HuffmanError::invalid_header(format!(
                    "symbol {:#04x} listed with a zero frequency",
                    symbol
                )));
            }

            seen[symbol as usize] = true;
            entries.push((symbol, count));
        }

        debug!(unique, freq_width, "read container header");

        Ok(Self {
            freq_width,
            entries,
        })
    }

    /// Per-symbol codes of the tree rebuilt from this header.
    pub fn code_table(&self) -> Vec<CodeEntry> {
        let tree = HuffmanTree::build(&self.to_table());

        self.entries
            .iter()
            .filter_map(|&(symbol, count)| {
                let code = tree.code(symbol)?;
                Some(CodeEntry {
                    symbol,
                    count,
                    code: code.iter().map(|&b| if b == 1 { '1' } else { '0' }).collect(),
                })
            })
            .collect()
    }
}

#[derive(Clone, Eq, PartialEq, Serialize, Debug)]
pub struct CodeEntry {
    pub symbol: u8,
    pub count: u64,
    pub code: String,
}

/// Size breakdown of a container.
#[derive(Clone, Default, Eq, PartialEq, Serialize, Debug)]
pub struct ContainerStats {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub unique_symbols: usize,
    pub freq_width: u32,
    pub header_bits: usize,
    pub payload_bits: usize,
    pub padding_bits: usize,
}

impl ContainerStats {
    /// Compressed size over original size, 0 for an empty message.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }
}

/// Compresses `input` into a container.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with_stats(input).map(|(container, _)| container)
}

pub fn compress_with_stats(input: &[u8]) -> Result<(Vec<u8>, ContainerStats)> {
    if input.is_empty() {
        return Ok((Vec::new(), ContainerStats::default()));
    }

    let freqs = FrequencyTable::from_bytes(input);
    let header = ContainerHeader::from_table(&freqs)?;
    let tree = HuffmanTree::build(&freqs);

    let mut writer = BitWriter::new(Vec::with_capacity(input.len() / 2 + header.bit_len() / 8 + 1));
    header.write(&mut writer)?;
    let header_bits = writer.written_bits();

    let codes = tree.code_book();
    for &b in input {
        codes.encode(b, &mut writer)?;
    }
    let payload_bits = writer.written_bits() - header_bits;

    writer.pad_to_byte()?;
    let padding_bits = writer.written_bits() - header_bits - payload_bits;
    let container = writer.into_inner()?;

    let stats = ContainerStats {
        original_bytes: input.len() as u64,
        compressed_bytes: container.len() as u64,
        unique_symbols: header.unique_symbols(),
        freq_width: header.freq_width,
        header_bits,
        payload_bits,
        padding_bits,
    };
    debug!(?stats, "compressed");

    Ok((container, stats))
}

/// Restores the message stored in `container`.
pub fn decompress(container: &[u8]) -> Result<Vec<u8>> {
    decompress_with_stats(container).map(|(output, _)| output)
}

pub fn decompress_with_stats(container: &[u8]) -> Result<(Vec<u8>, ContainerStats)> {
    let mut output = Vec::new();
    let stats = decode_container(container, Some(&mut output))?;
    Ok((output, stats))
}

/// Validates `container` by decoding it fully, without keeping the output.
pub fn inspect(container: &[u8]) -> Result<ContainerStats> {
    decode_container(container, None)
}

/// Reads only the header of a non-empty container.
pub fn read_header(container: &[u8]) -> Result<Option<ContainerHeader>> {
    if container.is_empty() {
        return Ok(None);
    }
    ContainerHeader::read(&mut BitReader::new(container)).map(Some)
}

fn decode_container(container: &[u8], mut output: Option<&mut Vec<u8>>) -> Result<ContainerStats> {
    if container.is_empty() {
        return Ok(ContainerStats::default());
    }

    let mut reader = BitReader::new(container);
    let header = ContainerHeader::read(&mut reader)?;
    let header_bits = reader.read_bits();

    // Every code takes at least one bit.
    let total = header.total_symbols();
    let available = (container.len() * BUF_BITS - header_bits) as u64;
    if total > available {
        return Err(HuffmanError::invalid_header(format!(
            "{} symbols declared but only {} payload bits follow",
            total, available
        )));
    }

    let tree = HuffmanTree::build(&header.to_table());
    if let Some(out) = output.as_mut() {
        out.reserve_exact(total as usize);
    }

    for _ in 0..total {
        let symbol = tree.decode(&mut reader)?;
        if let Some(out) = output.as_mut() {
            out.push(symbol);
        }
    }
    let payload_bits = reader.read_bits() - header_bits;
    let padding_bits = reader.remaining_in_byte();
    reader.expect_end()?;

    Ok(ContainerStats {
        original_bytes: total,
        compressed_bytes: container.len() as u64,
        unique_symbols: header.unique_symbols(),
        freq_width: header.freq_width,
        header_bits,
        payload_bits,
        padding_bits,
    })
}

/// Compresses the file at `source` into `dest`.
pub fn compress_file(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<ContainerStats> {
    let input = read_input(source.as_ref())?;
    let (container, stats) = compress_with_stats(&input)?;
    write_output(dest.as_ref(), &container)?;
    Ok(stats)
}

/// Decompresses the container at `source` into `dest`.
pub fn decompress_file(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<ContainerStats> {
    let container = read_input(source.as_ref())?;
    let (output, stats) = decompress_with_stats(&container)?;
    write_output(dest.as_ref(), &output)?;
    Ok(stats)
}

/// Decompresses the container at `source` into `dest` after checking it
/// against its `<source>.properties` sidecar.
///
/// A missing sidecar fails with [`HuffmanError::InputUnavailable`] and a
/// mismatch with [`HuffmanError::InvalidProperties`]; `dest` is only written
/// once the check has passed.
pub fn decompress_file_checked(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
) -> Result<ContainerStats> {
    let source = source.as_ref();
    let props = ContainerProperties::load(&sidecar_path(source))?;

    let container = read_input(source)?;
    let (output, stats) = decompress_with_stats(&container)?;
    props.check(&stats)?;

    write_output(dest.as_ref(), &output)?;
    Ok(stats)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| HuffmanError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a temporary file in the directory of `path` and moves it over
/// `path` on success, so that a failed write never leaves a truncated file
/// under the final name. The temporary file is removed when dropped.
fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let unwritable = |source: io::Error| HuffmanError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(unwritable)?;
    file.write_all(bytes).map_err(unwritable)?;
    file.persist(path).map_err(|e| unwritable(e.error))?;
    Ok(())
}
