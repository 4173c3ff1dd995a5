//! Adaptive binary range decoder as used by LZMA-family codecs.
//!
//! The decoder keeps the two 32-bit words of arithmetic-coder state (`range` and `code`)
//! and offers the primitives every LZMA model layer is written against:
//!
//! | Operation                    | Decoder                                   | Encoder (*)                               |
//! |------------------------------|-------------------------------------------|-------------------------------------------|
//! | Adaptive bit                 | [`RangeDecoder::decode_bit`]              | `RangeEncoder::encode_bit`                |
//! | Direct (50/50) bits          | [`RangeDecoder::decode_direct_bits`]      | `RangeEncoder::encode_direct_bits`        |
//! | Bit tree, MSB first          | [`RangeDecoder::decode_bit_tree`]         | `RangeEncoder::encode_bit_tree`           |
//! | Bit tree, LSB first          | [`RangeDecoder::decode_reverse_bit_tree`] | `RangeEncoder::encode_reverse_bit_tree`   |
//!
//! (*) Require the `encoder` cargo feature (enabled by default).
//!
//! Probability tables are plain `[u16]` slices owned by the caller. Initialize them with
//! [`init_bit_models`] before the first use.
//!
//! ```
//! use lzma_rc::{RangeDecoder, new_bit_models};
//!
//! let stream = [0x00, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
//! let mut rc = RangeDecoder::new(&stream[..]).unwrap();
//! let mut probs = new_bit_models::<4>();
//!
//! let bit = rc.decode_bit(&mut probs, 1).unwrap();
//! let raw = rc.decode_direct_bits(3).unwrap();
//! assert!(bit <= 1 && raw < 8);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod counting;
mod decoder;
#[cfg(feature = "encoder")]
mod encoder;
mod error;
mod probability;

pub use decoder::RangeDecoder;
#[cfg_attr(docsrs, doc(cfg(feature = "encoder")))]
#[cfg(feature = "encoder")]
pub use encoder::RangeEncoder;
pub use error::Error;
pub use probability::{init_bit_models, new_bit_models, update_prob_0, update_prob_1};

/// Result type of the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Number of bits of precision of a probability counter.
pub const NUM_BIT_MODEL_TOTAL_BITS: u32 = 11;
/// Fixed-point scale of a probability counter, `P(bit = 0) * BIT_MODEL_TOTAL`.
pub const BIT_MODEL_TOTAL: u32 = 1 << NUM_BIT_MODEL_TOTAL_BITS;
/// Adaptation speed of a probability counter.
pub const NUM_MOVE_BITS: u32 = 5;
/// Initial value of every probability counter (50/50).
pub const PROB_INIT: u16 = (BIT_MODEL_TOTAL / 2) as u16;
/// A set bit under this mask means `range` needs no renormalization.
pub const TOP_MASK: u32 = 0xFF00_0000;
/// Smallest `range` value left behind by any completed operation.
pub const TOP_VALUE: u32 = 1 << 24;
/// Number of bytes consumed when a decoder is initialized.
pub const INIT_SIZE: usize = 5;
