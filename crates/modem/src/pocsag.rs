//! Rectangular two-level synthesis for POCSAG
//!
//! Each bit of each 32-bit word, most significant first, becomes a run of
//! identical samples at [`SYMBOL_RATE`]: 0 is `+MAX`, 1 is `-MAX`. The
//! run is then resampled to the output rate by nearest neighbour.

use crate::{ModemError, Result};
use rawsignal_core::buffer::{try_with_capacity, PcmBuffer};
use rawsignal_core::resample::NearestResampler;
use rawsignal_core::MAX_PCM_VALUE;
use rawsignal_frame::pocsag::{encode_transmission, FunctionCode, PocsagAddress};
use tracing::{debug, info};

/// Intermediate symbol rate in Hz
pub const SYMBOL_RATE: u32 = 38400;

/// Baud rates pagers listen on
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [512, 1200, 2400];

const BITS_PER_WORD: usize = 32;

/// Intermediate samples per bit. The baud rate must divide
/// [`SYMBOL_RATE`] so every bit gets the same whole number of samples.
pub fn repeats_per_bit(baud_rate: u32) -> Result<usize> {
    if baud_rate == 0 || SYMBOL_RATE % baud_rate != 0 {
        return Err(ModemError::InvalidParameters {
            msg: format!("baud rate {} does not divide {}", baud_rate, SYMBOL_RATE),
        });
    }
    Ok((SYMBOL_RATE / baud_rate) as usize)
}

/// Output samples for `word_count` words
pub fn pcm_length(sample_rate: u32, baud_rate: u32, word_count: usize) -> usize {
    if baud_rate == 0 {
        return 0;
    }
    let bits = (word_count * BITS_PER_WORD) as u64;
    (bits * sample_rate as u64 / baud_rate as u64) as usize
}

/// Render transmission words at `sample_rate`
pub fn encode_pcm(sample_rate: u32, baud_rate: u32, words: &[u32]) -> Result<PcmBuffer> {
    let repeats = repeats_per_bit(baud_rate)?;
    let resampler = NearestResampler::new(SYMBOL_RATE, sample_rate)?;

    let symbol_len = words.len() * BITS_PER_WORD * repeats;
    let mut symbols = try_with_capacity(symbol_len, "POCSAG symbol buffer")?;
    for &word in words {
        for bit_num in (0..BITS_PER_WORD).rev() {
            let level = if (word >> bit_num) & 1 == 0 {
                MAX_PCM_VALUE
            } else {
                -MAX_PCM_VALUE
            };
            symbols.extend(std::iter::repeat(level).take(repeats));
        }
    }

    let len = pcm_length(sample_rate, baud_rate, words.len());
    let mut out = PcmBuffer::with_exact_capacity(len, sample_rate)?;
    resampler.process(&symbols, &mut out)?;

    debug!(
        words = words.len(),
        symbols = symbol_len,
        samples = len,
        "POCSAG words rendered"
    );
    Ok(out.finish()?)
}

/// Encode a page and render it
pub fn encode_pocsag(
    address: PocsagAddress,
    function: FunctionCode,
    message: &[u8],
    baud_rate: u32,
    sample_rate: u32,
) -> Result<PcmBuffer> {
    if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
        return Err(ModemError::InvalidParameters {
            msg: format!(
                "baud rate {} not one of {:?}",
                baud_rate, SUPPORTED_BAUD_RATES
            ),
        });
    }

    let words = encode_transmission(address, message, function)?;
    let pcm = encode_pcm(sample_rate, baud_rate, &words)?;

    info!(
        %address,
        ?function,
        baud = baud_rate,
        words = words.len(),
        samples = pcm.len(),
        "POCSAG page encoded"
    );
    Ok(pcm)
}
