//! POCSAG paging transmission encoder
//!
//! A transmission is a preamble of alternating bits followed by batches.
//! Every batch is one sync word and eight frames of two codewords. A pager
//! only listens in the frame selected by the low three bits of its
//! address, so the address codeword is preceded by idle codewords.
//!
//! ```text
//! | preamble x18 | SYNC | idle..idle | ADDR | MSG.. | SYNC | MSG.. | IDLE | idle.. |
//! ```
//!
//! The word count is computed once by [`TransmissionLayout`] and both
//! [`message_length`] and [`encode_transmission`] are derived from it.

use crate::crc::encode_codeword;
use crate::{FrameError, Result};
use rawsignal_core::buffer::try_with_capacity;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Batch synchronisation codeword
pub const SYNC_WORD: u32 = 0x7CD2_15D8;

/// Idle codeword
pub const IDLE_WORD: u32 = 0x7A89_C197;

/// Alternating 1010... preamble word
pub const PREAMBLE_WORD: u32 = 0xAAAA_AAAA;

/// Preamble length in bits
pub const PREAMBLE_BITS: usize = 576;

/// Preamble length in words
pub const PREAMBLE_WORDS: usize = PREAMBLE_BITS / 32;

/// Codewords in one batch, sync excluded
pub const BATCH_SIZE: usize = 16;

/// Words one batch occupies on air, sync included
pub const BATCH_WORDS: usize = BATCH_SIZE + 1;

/// Codewords per frame
pub const FRAME_SIZE: usize = 2;

/// Flag bit marking a message codeword
pub const FLAG_MESSAGE: u32 = 0x10_0000;

pub const TEXT_BITS_PER_WORD: usize = 20;
pub const TEXT_BITS_PER_CHAR: usize = 7;

/// Function bits carried in the address codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum FunctionCode {
    Numeric = 0,
    Tone1 = 1,
    Tone2 = 2,
    #[default]
    Alphanumeric = 3,
}

impl FunctionCode {
    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(FunctionCode::Numeric),
            1 => Ok(FunctionCode::Tone1),
            2 => Ok(FunctionCode::Tone2),
            3 => Ok(FunctionCode::Alphanumeric),
            _ => Err(FrameError::InvalidParameters {
                msg: format!("function code must be 0-3, got {}", value),
            }),
        }
    }
}

/// 21-bit pager address (RIC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PocsagAddress(u32);

impl PocsagAddress {
    pub const MAX: u32 = 0x1F_FFFF;

    pub fn value(self) -> u32 {
        self.0
    }

    /// Idle codewords between the sync word and the address codeword
    pub fn address_offset(self) -> usize {
        (self.0 & 0x7) as usize * FRAME_SIZE
    }

    /// Flag+data field of the address codeword
    pub fn codeword_data(self, function: FunctionCode) -> u32 {
        ((self.0 >> 3) << 2) | function.bits()
    }
}

impl TryFrom<u32> for PocsagAddress {
    type Error = FrameError;

    fn try_from(value: u32) -> Result<Self> {
        if value > Self::MAX {
            return Err(FrameError::InvalidAddress {
                msg: format!("POCSAG address {} exceeds {}", value, Self::MAX),
            });
        }
        Ok(Self(value))
    }
}

impl fmt::Display for PocsagAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Word counts of one transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmissionLayout {
    /// Idle words before the address codeword
    pub address_offset: usize,
    /// Message codewords
    pub message_words: usize,
    /// Codeword slots carrying something other than padding: leading
    /// idles, address, message and the end-of-message idle
    pub used_slots: usize,
    /// Batches after the preamble
    pub batches: usize,
}

impl TransmissionLayout {
    pub fn new(address: PocsagAddress, chars: usize) -> Self {
        let address_offset = address.address_offset();
        let message_words = (chars * TEXT_BITS_PER_CHAR).div_ceil(TEXT_BITS_PER_WORD);
        let used_slots = address_offset + 1 + message_words + 1;
        Self {
            address_offset,
            message_words,
            used_slots,
            batches: used_slots.div_ceil(BATCH_SIZE),
        }
    }

    /// Idle words filling out the last batch
    pub fn padding_words(&self) -> usize {
        self.batches * BATCH_SIZE - self.used_slots
    }

    /// Length of the whole transmission in words
    pub fn total_words(&self) -> usize {
        PREAMBLE_WORDS + self.batches * BATCH_WORDS
    }
}

/// Number of words [`encode_transmission`] produces for a message of
/// `chars` characters
pub fn message_length(address: PocsagAddress, chars: usize) -> usize {
    TransmissionLayout::new(address, chars).total_words()
}

/// Pack text into 20-bit message fields, 7 bits per character, least
/// significant character bit first. The last field is zero padded.
pub fn text_words(message: &[u8]) -> impl Iterator<Item = u32> + '_ {
    let total_bits = message.len() * TEXT_BITS_PER_CHAR;
    let words = total_bits.div_ceil(TEXT_BITS_PER_WORD);
    (0..words).map(move |word| {
        let mut field = 0u32;
        for slot in 0..TEXT_BITS_PER_WORD {
            let bit_index = word * TEXT_BITS_PER_WORD + slot;
            let bit = if bit_index < total_bits {
                let c = message[bit_index / TEXT_BITS_PER_CHAR];
                (c >> (bit_index % TEXT_BITS_PER_CHAR)) & 1
            } else {
                0
            };
            field = (field << 1) | bit as u32;
        }
        field
    })
}

/// Writes codewords into batch slots, opening each batch with a sync word
struct BatchWriter {
    words: Vec<u32>,
    position: usize,
}

impl BatchWriter {
    fn push(&mut self, codeword: u32) {
        if self.position % BATCH_SIZE == 0 {
            self.words.push(SYNC_WORD);
        }
        self.words.push(codeword);
        self.position += 1;
    }
}

/// Encode a complete transmission.
///
/// Characters are sent as their low seven bits.
pub fn encode_transmission(
    address: PocsagAddress,
    message: &[u8],
    function: FunctionCode,
) -> Result<Vec<u32>> {
    let layout = TransmissionLayout::new(address, message.len());
    let expected = layout.total_words();

    let mut words = try_with_capacity(expected, "POCSAG transmission")?;
    words.extend(std::iter::repeat(PREAMBLE_WORD).take(PREAMBLE_WORDS));

    let mut writer = BatchWriter { words, position: 0 };
    for _ in 0..layout.address_offset {
        writer.push(IDLE_WORD);
    }
    writer.push(encode_codeword(address.codeword_data(function)));
    for field in text_words(message) {
        writer.push(encode_codeword(field | FLAG_MESSAGE));
    }
    writer.push(IDLE_WORD);
    for _ in 0..layout.padding_words() {
        writer.push(IDLE_WORD);
    }

    let words = writer.words;
    if words.len() != expected {
        return Err(FrameError::SizeMismatch {
            expected,
            actual: words.len(),
        });
    }

    debug!(
        %address,
        ?function,
        chars = message.len(),
        batches = layout.batches,
        words = words.len(),
        "POCSAG transmission encoded"
    );
    Ok(words)
}

/// The batches of an encoded transmission, preamble skipped
pub fn batches(words: &[u32]) -> impl Iterator<Item = &[u32]> {
    words
        .get(PREAMBLE_WORDS..)
        .unwrap_or_default()
        .chunks(BATCH_WORDS)
}
