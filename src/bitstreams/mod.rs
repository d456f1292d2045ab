use std::io::{self, ErrorKind, Read, Write};

use num_traits::PrimInt;

use crate::error::{HuffmanError, Result};

/// Number of bits held by the one-byte buffer of both streams.
pub const BUF_BITS: usize = 8;

/// Width used by [`BitWriter::write_u32`] and [`BitReader::read_u32`].
pub const DEFAULT_INT_BITS: u32 = 32;

#[inline(always)]
fn bit_size<T: PrimInt>() -> u32 {
    T::zero().count_zeros()
}

/// Writes single bits to a byte sink, most significant bit first within each byte.
///
/// Bits are gathered in a one-byte buffer which is emitted as soon as it holds
/// eight bits. A partially filled buffer is only emitted by [`flush`](BitWriter::flush)
/// (or [`into_inner`](BitWriter::into_inner)), so callers that stop on a non-aligned
/// position must pad or flush before dropping the writer.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    os: W,
    current: u8,
    fill: usize,
    written_bits: usize,
}

impl<W: Write> BitWriter<W> {
    pub fn new(os: W) -> Self {
        BitWriter {
            os,
            current: 0,
            fill: 0,
            written_bits: 0,
        }
    }

    #[inline(always)]
    fn write(&mut self, b: u8) -> io::Result<()> {
        self.os.write_all(&[b])
    }

    #[inline(always)]
    fn write_if_full(&mut self) -> io::Result<()> {
        if self.fill == BUF_BITS {
            self.write(self.current)?;
            self.current = 0;
            self.fill = 0;
        }
        Ok(())
    }

    /// Appends the least significant bit of `bit`.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: u8) -> io::Result<()> {
        self.write_if_full()?;

        if bit & 1 == 1 {
            self.current |= 1 << (BUF_BITS - 1 - self.fill);
        }
        self.fill += 1;
        self.written_bits += 1;

        self.write_if_full()
    }

    /// Writes the eight bits of `b`, least significant bit first.
    pub fn write_byte(&mut self, b: u8) -> io::Result<()> {
        self.write_int(b, BUF_BITS as u32)
    }

    /// Writes the lowest `width` bits of `value`, least significant bit first.
    pub fn write_int<T: PrimInt>(&mut self, value: T, width: u32) -> io::Result<()> {
        assert!(
            width <= bit_size::<T>(),
            "Cannot write {} bits of a {}-bit integer",
            width,
            bit_size::<T>()
        );

        for i in 0..width as usize {
            let bit = (value >> i) & T::one();
            self.write_bit(if bit == T::one() { 1 } else { 0 })?;
        }
        Ok(())
    }

    #[inline(always)]
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_int(value, DEFAULT_INT_BITS)
    }

    /// Writes zero bits until the stream is byte aligned.
    pub fn pad_to_byte(&mut self) -> io::Result<()> {
        while self.fill != 0 {
            self.write_bit(0)?;
        }
        Ok(())
    }

    /// Emits the pending byte, if any bit is pending, and flushes the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.fill > 0 {
            self.write(self.current)?;
            self.current = 0;
            self.fill = 0;
        }
        self.os.flush()
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.os)
    }

    #[inline(always)]
    pub fn written_bits(&self) -> usize {
        self.written_bits
    }

    /// Bits currently held in the buffer and not yet emitted.
    #[inline(always)]
    pub fn pending_bits(&self) -> usize {
        self.fill
    }

    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        self.fill == 0
    }
}

/// Reads single bits from a byte source, most significant bit first within each byte.
///
/// Every read is bounds checked: running out of source bytes yields
/// [`HuffmanError::UnexpectedEof`] instead of a filler value.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    is: R,
    current: u8,
    /// Number of bits of `current` already handed out.
    consumed: usize,
    read_bits: usize,
}

impl<R: Read> BitReader<R> {
    pub fn new(input_stream: R) -> Self {
        BitReader {
            is: input_stream,
            current: 0,
            consumed: BUF_BITS,
            read_bits: 0,
        }
    }

    /// Reads the next byte of the source, `None` at its end.
    fn read(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.is.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[inline(always)]
    fn refill(&mut self) -> Result<()> {
        match self.read()? {
            Some(b) => {
                self.current = b;
                self.consumed = 0;
                Ok(())
            }
            None => Err(HuffmanError::UnexpectedEof {
                bits_read: self.read_bits,
            }),
        }
    }

    /// Returns the next bit, 0 or 1.
    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<u8> {
        if self.consumed == BUF_BITS {
            self.refill()?;
        }

        let bit = (self.current >> (BUF_BITS - 1 - self.consumed)) & 1;
        self.consumed += 1;
        self.read_bits += 1;
        Ok(bit)
    }

    /// Reads a byte written by [`BitWriter::write_byte`].
    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_int(BUF_BITS as u32)
    }

    /// Reads `width` bits, least significant bit first.
    pub fn read_int<T: PrimInt>(&mut self, width: u32) -> Result<T> {
        assert!(
            width <= bit_size::<T>(),
            "Cannot read {} bits into a {}-bit integer",
            width,
            bit_size::<T>()
        );

        let mut x = T::zero();
        for i in 0..width as usize {
            if self.read_bit()? == 1 {
                x = x | (T::one() << i);
            }
        }
        Ok(x)
    }

    #[inline(always)]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_int(DEFAULT_INT_BITS)
    }

    #[inline(always)]
    pub fn read_bits(&self) -> usize {
        self.read_bits
    }

    /// Bits of the current byte that have not been read yet.
    #[inline(always)]
    pub fn remaining_in_byte(&self) -> usize {
        BUF_BITS - self.consumed
    }

    /// Checks that the rest of the current byte is zero padding and that the
    /// source holds no further bytes.
    pub fn expect_end(&mut self) -> Result<()> {
        let remaining = self.remaining_in_byte();
        let dirty_padding = (self.current as u16) & ((1u16 << remaining) - 1) != 0;

        let mut extra_bytes = 0;
        while self.read()?.is_some() {
            extra_bytes += 1;
        }

        if dirty_padding || extra_bytes > 0 {
            return Err(HuffmanError::TrailingData {
                bits: remaining + extra_bytes * BUF_BITS,
            });
        }
        Ok(())
    }
}
