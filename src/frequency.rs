use crate::NUM_SYMBOLS;

/// Occurrence count of every byte value in a message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FrequencyTable {
    counts: Box<[u64]>,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: vec![0; NUM_SYMBOLS].into_boxed_slice(),
        }
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = Self::new();
        for &b in bytes {
            table.increment(b);
        }
        table
    }

    #[inline(always)]
    pub fn increment(&mut self, symbol: u8) {
        self.counts[symbol as usize] += 1;
    }

    #[inline(always)]
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, symbol: u8, count: u64) {
        self.counts[symbol as usize] = count;
    }

    /// Sum of all counts, that is the length of the message.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of symbols with a nonzero count.
    pub fn unique_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c != 0).count()
    }

    pub fn max_frequency(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Present symbols with their counts, in increasing symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

impl FromIterator<u8> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut table = Self::new();
        for b in iter {
            table.increment(b);
        }
        table
    }
}
