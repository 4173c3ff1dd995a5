use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    BIT_MODEL_TOTAL, Error, NUM_BIT_MODEL_TOTAL_BITS, TOP_MASK,
    counting::CountingReader,
    probability::{update_prob_0, update_prob_1},
};

/// Decoding half of an LZMA-style binary range coder.
///
/// Every operation leaves `range >= 0x0100_0000` and, on a well-formed stream,
/// `code < range`. After an error the session is over: the state can't be resumed.
pub struct RangeDecoder<R> {
    range: u32,
    code: u32,
    reader: CountingReader<R>,
}

impl<R: Read> RangeDecoder<R> {
    /// Reads the five initial bytes of a range coder stream.
    ///
    /// The first byte is shifted out of the 32-bit code and is not validated,
    /// see [`RangeDecoder::new_strict`] for the checked variant.
    pub fn new(reader: R) -> crate::Result<Self> {
        let mut decoder = Self {
            range: 0xFFFF_FFFF,
            code: 0,
            reader: CountingReader::new(reader),
        };

        decoder.read_byte()?;
        decoder.code = decoder
            .reader
            .read_u32::<BigEndian>()
            .map_err(|e| Error::read(e, decoder.reader.read_bytes()))?;

        Ok(decoder)
    }

    /// Like [`RangeDecoder::new`], but rejects streams a compliant encoder can't produce:
    /// a non-zero first byte, or an initial code of `0xFFFFFFFF`.
    pub fn new_strict(reader: R) -> crate::Result<Self> {
        let mut decoder = Self {
            range: 0xFFFF_FFFF,
            code: 0,
            reader: CountingReader::new(reader),
        };

        let first = decoder.read_byte()?;
        if first != 0 {
            return Err(Error::BadInitByte(first));
        }
        for _ in 0..4 {
            decoder.code = decoder.code << 8 | decoder.read_byte()? as u32;
        }

        if decoder.code == 0xFFFF_FFFF {
            return Err(Error::BadInitCode);
        }

        Ok(decoder)
    }

    fn read_byte(&mut self) -> crate::Result<u8> {
        self.reader
            .read_u8()
            .map_err(|e| Error::read(e, self.reader.read_bytes()))
    }

    #[inline(always)]
    fn normalize(&mut self) -> crate::Result<()> {
        if self.range & TOP_MASK == 0 {
            self.code = self.code << 8 | self.read_byte()? as u32;
            self.range <<= 8;
        }
        Ok(())
    }

    /// Decodes one bit with the adaptive probability `probs[index]` and updates it.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds for `probs`.
    #[inline(always)]
    pub fn decode_bit(&mut self, probs: &mut [u16], index: usize) -> crate::Result<u32> {
        let prob = probs[index];
        debug_assert!((prob as u32) < BIT_MODEL_TOTAL);

        let bound = (self.range >> NUM_BIT_MODEL_TOTAL_BITS).wrapping_mul(prob as u32);
        let bit = if self.code < bound {
            self.range = bound;
            probs[index] = update_prob_0(prob);
            0
        } else {
            self.range = self.range.wrapping_sub(bound);
            self.code = self.code.wrapping_sub(bound);
            probs[index] = update_prob_1(prob);
            1
        };

        self.normalize()?;
        Ok(bit)
    }

    /// Decodes `count` bits with a fixed 50/50 probability, most significant bit first.
    ///
    /// # Panics
    ///
    /// If `count` is larger than 32.
    pub fn decode_direct_bits(&mut self, count: u32) -> crate::Result<u32> {
        assert!(count <= 32, "can't decode {count} direct bits into a u32");

        let mut result = 0u32;
        for _ in 0..count {
            self.range >>= 1;
            let bit = if self.code >= self.range {
                self.code -= self.range;
                1
            } else {
                0
            };
            result = result << 1 | bit;
            self.normalize()?;
        }
        Ok(result)
    }

    /// Decodes a `num_bits` wide symbol through a bit tree, most significant bit first.
    ///
    /// `probs` must hold at least `1 << num_bits` counters; index 0 is never used.
    pub fn decode_bit_tree(&mut self, probs: &mut [u16], num_bits: u32) -> crate::Result<u32> {
        assert!(num_bits < 32);

        let mut m = 1u32;
        for _ in 0..num_bits {
            m = m << 1 | self.decode_bit(probs, m as usize)?;
        }
        Ok(m - (1 << num_bits))
    }

    /// Decodes a `num_bits` wide symbol through a bit tree, least significant bit first.
    pub fn decode_reverse_bit_tree(
        &mut self,
        probs: &mut [u16],
        num_bits: u32,
    ) -> crate::Result<u32> {
        assert!(num_bits < 32);

        let mut m = 1u32;
        let mut symbol = 0u32;
        for i in 0..num_bits {
            let bit = self.decode_bit(probs, m as usize)?;
            m = m << 1 | bit;
            symbol |= bit << i;
        }
        Ok(symbol)
    }
}

impl<R> RangeDecoder<R> {
    /// Width of the current interval.
    pub fn range(&self) -> u32 {
        self.range
    }

    /// Position of the coded value inside the current interval.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Number of bytes consumed from the source, including the five init bytes.
    pub fn position(&self) -> u64 {
        self.reader.read_bytes()
    }

    /// `true` once the coded value reached zero, which is where a compliant encoder's
    /// flush leaves the decoder after the last symbol.
    pub fn is_finished(&self) -> bool {
        self.code == 0
    }

    /// Ends the session and gives back the byte source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R> std::fmt::Debug for RangeDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeDecoder")
            .field("range", &format_args!("{:#010X}", self.range))
            .field("code", &format_args!("{:#010X}", self.code))
            .field("position", &self.position())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PROB_INIT, new_bit_models};

    fn with_state(input: &[u8], range: u32, code: u32) -> RangeDecoder<&[u8]> {
        RangeDecoder {
            range,
            code,
            reader: CountingReader::new(input),
        }
    }

    #[test]
    fn test_init_reads_five_bytes() {
        let input = [0x00, 0x12, 0x34, 0x56, 0x78, 0xAA];
        let rc = RangeDecoder::new(&input[..]).unwrap();
        assert_eq!(rc.code(), 0x12345678);
        assert_eq!(rc.range(), 0xFFFFFFFF);
        assert_eq!(rc.position(), 5);
        assert_eq!(rc.into_inner(), &[0xAA]);
    }

    #[test]
    fn test_init_shifts_out_first_byte() {
        let rc = RangeDecoder::new(&[0xFF, 0x01, 0x02, 0x03, 0x04][..]).unwrap();
        assert_eq!(rc.code(), 0x01020304);
    }

    #[test]
    fn test_direct_bit_zero() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0x00000000);
        assert_eq!(rc.decode_direct_bits(1).unwrap(), 0);
        assert_eq!(rc.range(), 0x7FFFFFFF);
        assert_eq!(rc.code(), 0x00000000);
        assert_eq!(rc.position(), 0);
    }

    #[test]
    fn test_direct_bit_one() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0xFFFFFFFE);
        assert_eq!(rc.decode_direct_bits(1).unwrap(), 1);
        assert_eq!(rc.range(), 0x7FFFFFFF);
        assert_eq!(rc.code(), 0x7FFFFFFF);
    }

    #[test]
    fn test_direct_bits_zero_count() {
        let mut rc = with_state(&[], 0x01000000, 0x00FFFFFF);
        assert_eq!(rc.decode_direct_bits(0).unwrap(), 0);
        assert_eq!(rc.range(), 0x01000000);
        assert_eq!(rc.code(), 0x00FFFFFF);
    }

    #[test]
    fn test_direct_bits_msb_first_with_renormalization() {
        // Only the first halving drops range below the top value.
        let mut rc = with_state(&[0x11, 0x22], 0x01000000, 0x00A00000);
        assert_eq!(rc.decode_direct_bits(2).unwrap(), 0b10);
        assert_eq!(rc.position(), 1);
        assert_eq!(rc.range(), 0x40000000);
        assert_eq!(rc.code(), 0x20000011);
    }

    #[test]
    #[should_panic]
    fn test_direct_bits_too_many() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0);
        let _ = rc.decode_direct_bits(33);
    }

    #[test]
    fn test_decode_bit_zero() {
        let mut rc = with_state(&[], 0x08000000, 0x02000000);
        let mut probs = [PROB_INIT];
        assert_eq!(rc.decode_bit(&mut probs, 0).unwrap(), 0);
        assert_eq!(rc.range(), 0x04000000);
        assert_eq!(rc.code(), 0x02000000);
        assert_eq!(probs[0], 1056);
    }

    #[test]
    fn test_decode_bit_one() {
        let mut rc = with_state(&[], 0x08000000, 0x05000000);
        let mut probs = [PROB_INIT];
        assert_eq!(rc.decode_bit(&mut probs, 0).unwrap(), 1);
        assert_eq!(rc.range(), 0x04000000);
        assert_eq!(rc.code(), 0x01000000);
        assert_eq!(probs[0], 992);
    }

    #[test]
    fn test_decode_bit_renormalizes() {
        let mut rc = with_state(&[0x7A], 0x01000000, 0x00800000);
        let mut probs = [PROB_INIT; 3];
        assert_eq!(rc.decode_bit(&mut probs, 2).unwrap(), 1);
        assert_eq!(rc.range(), 0x80000000);
        assert_eq!(rc.code(), 0x0000007A);
        assert_eq!(probs, [1024, 1024, 992]);
        assert_eq!(rc.position(), 1);
    }

    #[test]
    fn test_decode_bit_exhausted() {
        let mut rc = with_state(&[], 0x01000000, 0x00800000);
        let mut probs = [PROB_INIT];
        let err = rc.decode_bit(&mut probs, 0).unwrap_err();
        assert!(matches!(err, Error::StreamExhausted { position: 0 }));
    }

    #[test]
    #[should_panic]
    fn test_decode_bit_index_out_of_bounds() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0);
        let mut probs = [PROB_INIT; 2];
        let _ = rc.decode_bit(&mut probs, 2);
    }

    #[test]
    fn test_bit_tree_all_zero() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0);
        let mut probs = new_bit_models::<8>();
        assert_eq!(rc.decode_bit_tree(&mut probs, 3).unwrap(), 0);
        assert_eq!(probs, [1024, 1056, 1056, 1024, 1056, 1024, 1024, 1024]);
    }

    #[test]
    fn test_bit_tree_all_one() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0xFFFFFFFE);
        let mut probs = new_bit_models::<8>();
        assert_eq!(rc.decode_bit_tree(&mut probs, 3).unwrap(), 7);
        assert_eq!(probs, [1024, 992, 1024, 992, 1024, 1024, 1024, 992]);
        assert_eq!(rc.code(), 0x200003FE);
        assert_eq!(rc.range(), 0x200003FF);
    }

    #[test]
    fn test_reverse_bit_tree() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0);
        let mut probs = new_bit_models::<8>();
        assert_eq!(rc.decode_reverse_bit_tree(&mut probs, 3).unwrap(), 0);
        assert_eq!(probs, [1024, 1056, 1056, 1024, 1056, 1024, 1024, 1024]);

        let mut rc = with_state(&[], 0xFFFFFFFF, 0xFFFFFFFE);
        let mut probs = new_bit_models::<8>();
        assert_eq!(rc.decode_reverse_bit_tree(&mut probs, 3).unwrap(), 7);
    }

    #[test]
    fn test_bit_tree_zero_bits() {
        let mut rc = with_state(&[], 0xFFFFFFFF, 0x1234);
        let mut probs = new_bit_models::<1>();
        assert_eq!(rc.decode_bit_tree(&mut probs, 0).unwrap(), 0);
        assert_eq!(rc.decode_reverse_bit_tree(&mut probs, 0).unwrap(), 0);
        assert_eq!(rc.code(), 0x1234);
        assert_eq!(probs, [PROB_INIT]);
    }

    #[test]
    fn test_is_finished_and_debug() {
        let rc = with_state(&[], 0xFFFFFFFF, 0);
        assert!(rc.is_finished());
        let text = format!("{rc:?}");
        assert!(text.contains("0xFFFFFFFF"));
        assert!(!with_state(&[], 0xFFFFFFFF, 1).is_finished());
    }
}
