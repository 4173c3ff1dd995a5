use std::io::Write;

use byteorder::WriteBytesExt;

use crate::{
    BIT_MODEL_TOTAL, Error, NUM_BIT_MODEL_TOTAL_BITS, TOP_VALUE,
    counting::CountingWriter,
    probability::{update_prob_0, update_prob_1},
};

/// Encoding half of the range coder, the exact mirror of [`crate::RangeDecoder`].
///
/// Bytes are held back in a one byte cache plus a run of pending `0xFF` bytes until
/// it's known whether a carry out of `low` reaches them.
pub struct RangeEncoder<W: Write> {
    low: u64,
    range: u32,
    cache: u8,
    cache_size: u64,
    writer: CountingWriter<W>,
}

impl<W: Write> RangeEncoder<W> {
    /// Creates a new [`RangeEncoder`] writing into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            low: 0,
            range: 0xFFFF_FFFF,
            cache: 0,
            cache_size: 1,
            writer: CountingWriter::new(writer),
        }
    }

    /// Bytes already handed to the writer. Cached and pending bytes are not included.
    pub fn bytes_written(&self) -> u64 {
        self.writer.written_bytes()
    }

    fn shift_low(&mut self) -> crate::Result<()> {
        if self.low < 0xFF00_0000 || self.low > 0xFFFF_FFFF {
            let carry = (self.low >> 32) as u8;
            let mut temp = self.cache;
            loop {
                self.writer
                    .write_u8(temp.wrapping_add(carry))
                    .map_err(|e| Error::io_msg(e, "writing range coder output"))?;
                temp = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = (self.low & 0x00FF_FFFF) << 8;
        Ok(())
    }

    #[inline(always)]
    fn normalize(&mut self) -> crate::Result<()> {
        if self.range < TOP_VALUE {
            self.range <<= 8;
            self.shift_low()?;
        }
        Ok(())
    }

    /// Encodes `bit` (0 or 1) with the adaptive probability `probs[index]` and updates it.
    #[inline(always)]
    pub fn encode_bit(&mut self, probs: &mut [u16], index: usize, bit: u32) -> crate::Result<()> {
        let prob = probs[index];
        debug_assert!((prob as u32) < BIT_MODEL_TOTAL);

        let bound = (self.range >> NUM_BIT_MODEL_TOTAL_BITS) * prob as u32;
        if bit == 0 {
            self.range = bound;
            probs[index] = update_prob_0(prob);
        } else {
            self.low += bound as u64;
            self.range -= bound;
            probs[index] = update_prob_1(prob);
        }

        self.normalize()
    }

    /// Encodes the low `count` bits of `value` at a fixed 50/50 probability,
    /// most significant bit first.
    pub fn encode_direct_bits(&mut self, value: u32, count: u32) -> crate::Result<()> {
        assert!(count <= 32, "can't encode {count} direct bits from a u32");

        for i in (0..count).rev() {
            self.range >>= 1;
            if (value >> i) & 1 != 0 {
                self.low += self.range as u64;
            }
            self.normalize()?;
        }
        Ok(())
    }

    /// Encodes a `num_bits` wide `symbol` through a bit tree, most significant bit first.
    pub fn encode_bit_tree(
        &mut self,
        probs: &mut [u16],
        num_bits: u32,
        symbol: u32,
    ) -> crate::Result<()> {
        let mut m = 1u32;
        for i in (0..num_bits).rev() {
            let bit = (symbol >> i) & 1;
            self.encode_bit(probs, m as usize, bit)?;
            m = m << 1 | bit;
        }
        Ok(())
    }

    /// Encodes a `num_bits` wide `symbol` through a bit tree, least significant bit first.
    pub fn encode_reverse_bit_tree(
        &mut self,
        probs: &mut [u16],
        num_bits: u32,
        symbol: u32,
    ) -> crate::Result<()> {
        let mut m = 1u32;
        for i in 0..num_bits {
            let bit = (symbol >> i) & 1;
            self.encode_bit(probs, m as usize, bit)?;
            m = m << 1 | bit;
        }
        Ok(())
    }

    /// Flushes the coder state and returns the writer.
    pub fn finish(mut self) -> crate::Result<W> {
        for _ in 0..5 {
            self.shift_low()?;
        }
        self.writer.flush()?;
        Ok(self.writer.into_inner())
    }
}
