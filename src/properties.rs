use std::{
    collections::HashMap,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    container::ContainerStats,
    error::{HuffmanError, Result},
};

/// Description of a container, stored next to it as `<container>.properties`.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct ContainerProperties {
    pub symbols: u64,
    pub unique_symbols: usize,
    pub freq_width: u32,
    pub header_bits: usize,
    pub payload_bits: usize,
    pub padding_bits: usize,
    pub compressed_bytes: u64,
}

/// `<path>.properties`
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".properties");
    path.with_file_name(name)
}

fn parse<T: std::str::FromStr>(value: &HashMap<String, String>, key: &str) -> Result<T> {
    let raw = value
        .get(key)
        .ok_or_else(|| HuffmanError::InvalidProperties(format!("missing {}", key)))?;

    raw.trim()
        .parse()
        .map_err(|_| HuffmanError::InvalidProperties(format!("{} is not a number: {}", key, raw)))
}

impl TryFrom<HashMap<String, String>> for ContainerProperties {
    type Error = HuffmanError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        Ok(ContainerProperties {
            symbols: parse(&value, "symbols")?,
            unique_symbols: parse(&value, "uniquesymbols")?,
            freq_width: parse(&value, "bitfreqwidth")?,
            header_bits: parse(&value, "headerbits")?,
            payload_bits: parse(&value, "payloadbits")?,
            padding_bits: parse(&value, "paddingbits")?,
            compressed_bytes: parse(&value, "compressedbytes")?,
        })
    }
}

impl From<&ContainerStats> for ContainerProperties {
    fn from(stats: &ContainerStats) -> Self {
        ContainerProperties {
            symbols: stats.original_bytes,
            unique_symbols: stats.unique_symbols,
            freq_width: stats.freq_width,
            header_bits: stats.header_bits,
            payload_bits: stats.payload_bits,
            padding_bits: stats.padding_bits,
            compressed_bytes: stats.compressed_bytes,
        }
    }
}

impl From<ContainerProperties> for String {
    fn from(val: ContainerProperties) -> Self {
        let mut s = String::new();

        s.push_str("#Huffman container properties\n");
        s.push_str("version=0\n");
        s.push_str(&format!("symbols={}\n", val.symbols));
        s.push_str(&format!("uniquesymbols={}\n", val.unique_symbols));
        s.push_str(&format!("bitfreqwidth={}\n", val.freq_width));
        s.push_str(&format!("headerbits={}\n", val.header_bits));
        s.push_str(&format!("payloadbits={}\n", val.payload_bits));
        s.push_str(&format!("paddingbits={}\n", val.padding_bits));
        s.push_str(&format!("compressedbytes={}\n", val.compressed_bytes));

        s
    }
}

impl ContainerProperties {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| HuffmanError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let p = java_properties::read(BufReader::new(file))
            .map_err(|e| HuffmanError::InvalidProperties(e.to_string()))?;

        Self::try_from(p)
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        let text = String::from(self.clone());
        fs::write(path, text).map_err(|source| HuffmanError::OutputUnwritable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fails on the first field that differs from `stats`.
    pub fn check(&self, stats: &ContainerStats) -> Result<()> {
        let found = ContainerProperties::from(stats);

        let fields = [
            ("symbols", self.symbols, found.symbols),
            ("uniquesymbols", self.unique_symbols as u64, found.unique_symbols as u64),
            ("bitfreqwidth", self.freq_width as u64, found.freq_width as u64),
            ("headerbits", self.header_bits as u64, found.header_bits as u64),
            ("payloadbits", self.payload_bits as u64, found.payload_bits as u64),
            ("paddingbits", self.padding_bits as u64, found.padding_bits as u64),
            ("compressedbytes", self.compressed_bytes, found.compressed_bytes),
        ];

        for (key, expected, actual) in fields {
            if expected != actual {
                return Err(HuffmanError::InvalidProperties(format!(
                    "{} is {} but the container has {}",
                    key, expected, actual
                )));
            }
        }
        Ok(())
    }
}
