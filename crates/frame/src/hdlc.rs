//! HDLC bit emission for AX.25
//!
//! Turns frame bytes into the logical bit stream sent on air:
//! - flag bytes (0x7E) as preamble and delimiters, never stuffed
//! - frame bytes LSB first with a 0 inserted after five consecutive 1s
//!
//! NRZI line coding is applied afterwards, one bit at a time, by
//! [`NrziEncoder`]; the synthesizer keys its tone from the line level.

use crate::{FrameError, Result};
use rawsignal_core::buffer::try_with_capacity;
use tracing::debug;

/// HDLC flag byte (0x7E = 01111110)
pub const HDLC_FLAG: u8 = 0x7E;

/// Flags sent before the opening delimiter
pub const DEFAULT_PREAMBLE_FLAGS: usize = 16;

/// A run of this many 1 bits is followed by a stuffed 0
pub const MAX_ONES_RUN: u8 = 5;

/// Walk `data` LSB first, calling `emit` for every bit including stuffed
/// zeros. `ones_run` carries the run of 1s across calls.
fn for_each_stuffed_bit(data: &[u8], ones_run: &mut u8, mut emit: impl FnMut(bool)) {
    for &byte in data {
        for bit_idx in 0..8 {
            let bit = (byte >> bit_idx) & 1 != 0;
            emit(bit);
            if bit {
                *ones_run += 1;
                if *ones_run == MAX_ONES_RUN {
                    emit(false);
                    *ones_run = 0;
                }
            } else {
                *ones_run = 0;
            }
        }
    }
}

/// Number of zeros stuffing inserts into `data`
pub fn stuffed_bit_count(data: &[u8]) -> usize {
    let mut ones_run = 0;
    let mut total = 0;
    for_each_stuffed_bit(data, &mut ones_run, |_| total += 1);
    total - data.len() * 8
}

/// HDLC frame encoder.
///
/// Holds the bit-stuffing run counter for one encode session. The
/// counter is reset at the start of every [`HdlcEncoder::encode`] call.
#[derive(Debug, Clone)]
pub struct HdlcEncoder {
    preamble_flags: usize,
    ones_run: u8,
}

impl HdlcEncoder {
    /// Encoder with the default 16 preamble flags
    pub fn new() -> Self {
        Self::with_preamble(DEFAULT_PREAMBLE_FLAGS)
    }

    /// Encoder with a custom preamble length
    pub fn with_preamble(preamble_flags: usize) -> Self {
        Self {
            preamble_flags,
            ones_run: 0,
        }
    }

    pub fn preamble_flags(&self) -> usize {
        self.preamble_flags
    }

    /// Number of flag bytes around the data: preamble, start and end
    pub fn flag_count(&self) -> usize {
        self.preamble_flags + 2
    }

    /// Exact number of bits [`HdlcEncoder::encode`] will produce for `frame`
    pub fn bit_count(&self, frame: &[u8]) -> usize {
        self.flag_count() * 8 + frame.len() * 8 + stuffed_bit_count(frame)
    }

    /// Encode frame bytes (FCS included) into logical HDLC bits.
    ///
    /// Output: preamble flags, start flag, stuffed data, end flag.
    pub fn encode(&mut self, frame: &[u8]) -> Result<Vec<bool>> {
        self.ones_run = 0;

        let expected = self.bit_count(frame);
        let mut bits = try_with_capacity(expected, "HDLC bit stream")?;

        for _ in 0..=self.preamble_flags {
            push_flag(&mut bits);
        }
        for_each_stuffed_bit(frame, &mut self.ones_run, |bit| bits.push(bit));
        push_flag(&mut bits);

        if bits.len() != expected {
            return Err(FrameError::SizeMismatch {
                expected,
                actual: bits.len(),
            });
        }

        debug!(
            frame_bytes = frame.len(),
            stuffed = bits.len() - self.flag_count() * 8 - frame.len() * 8,
            "HDLC frame encoded"
        );
        Ok(bits)
    }
}

impl Default for HdlcEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Push a flag as 8 bits (LSB first, no bit-stuffing)
fn push_flag(bits: &mut Vec<bool>) {
    for i in 0..8 {
        bits.push((HDLC_FLAG >> i) & 1 != 0);
    }
}

/// NRZI line coder: a 0 inverts the line level, a 1 keeps it.
///
/// The level starts at mark (`true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NrziEncoder {
    mark: bool,
}

impl NrziEncoder {
    pub fn new() -> Self {
        Self { mark: true }
    }

    /// Current line level, `true` for mark
    pub fn is_mark(&self) -> bool {
        self.mark
    }

    /// Feed one logical bit and return the resulting line level
    pub fn encode_bit(&mut self, bit: bool) -> bool {
        if !bit {
            self.mark = !self.mark;
        }
        self.mark
    }

    pub fn reset(&mut self) {
        self.mark = true;
    }
}

impl Default for NrziEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// NRZI-encode a whole bit stream
pub fn nrzi_encode(bits: &[bool]) -> Vec<bool> {
    let mut encoder = NrziEncoder::new();
    bits.iter().map(|&bit| encoder.encode_bit(bit)).collect()
}

/// Recover logical bits from NRZI line levels: no change means 1
pub fn nrzi_decode(levels: &[bool]) -> Vec<bool> {
    let mut previous = true;
    levels
        .iter()
        .map(|&level| {
            let bit = level == previous;
            previous = level;
            bit
        })
        .collect()
}

/// Drop the 0 that follows every run of five 1s
pub fn unstuff(bits: &[bool]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bits.len());
    let mut ones_run = 0u8;
    for &bit in bits {
        if ones_run == MAX_ONES_RUN {
            ones_run = 0;
            if !bit {
                continue;
            }
        }
        out.push(bit);
        ones_run = if bit { ones_run + 1 } else { 0 };
    }
    out
}

/// Pack bits into bytes, LSB first. A trailing partial byte is dropped.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit) << i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ax25::{Ax25Frame, Callsign};
    use quickcheck_macros::quickcheck;

    fn flag_bits() -> Vec<bool> {
        let mut bits = Vec::new();
        push_flag(&mut bits);
        bits
    }

    /// Strip flags, undo NRZI and stuffing
    fn recover(levels: &[bool], preamble_flags: usize) -> Vec<u8> {
        let bits = nrzi_decode(levels);
        let data = &bits[(preamble_flags + 1) * 8..bits.len() - 8];
        bits_to_bytes(&unstuff(data))
    }

    #[test]
    fn test_flag_bypasses_stuffing() {
        // Six ones in a row: run through the stuffer a flag would gain a zero
        assert_eq!(
            flag_bits(),
            vec![false, true, true, true, true, true, true, false]
        );
        assert_eq!(stuffed_bit_count(&[HDLC_FLAG]), 1);

        let mut encoder = HdlcEncoder::with_preamble(2);
        let bits = encoder.encode(&[0x00]).unwrap();
        assert_eq!(bits.len(), 4 * 8 + 8);
        for flag in [&bits[..8], &bits[8..16], &bits[16..24], &bits[bits.len() - 8..]] {
            assert_eq!(flag, flag_bits().as_slice());
        }
        assert_eq!(&bits[24..32], &[false; 8]);
    }

    #[test]
    fn test_stuffing_after_five_ones() {
        let mut encoder = HdlcEncoder::with_preamble(0);
        let bits = encoder.encode(&[0xFF]).unwrap();
        let data = &bits[8..bits.len() - 8];
        assert_eq!(
            data,
            &[true, true, true, true, true, false, true, true, true]
        );
        assert_eq!(stuffed_bit_count(&[0xFF, 0xFF]), 3);
    }

    #[test]
    fn test_layout_and_length() {
        let mut encoder = HdlcEncoder::new();
        let frame = [0x01, 0xFF, 0x7E];
        let bits = encoder.encode(&frame).unwrap();
        assert_eq!(bits.len(), encoder.bit_count(&frame));
        assert_eq!(bits.len(), 18 * 8 + 24 + stuffed_bit_count(&frame));

        let flag = flag_bits();
        for i in 0..17 {
            assert_eq!(&bits[i * 8..(i + 1) * 8], flag.as_slice());
        }
        assert_eq!(&bits[bits.len() - 8..], flag.as_slice());
    }

    #[test]
    fn test_run_counter_reset_between_calls() {
        let mut encoder = HdlcEncoder::with_preamble(1);
        let first = encoder.encode(&[0x0F]).unwrap();
        let second = encoder.encode(&[0x0F]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nrzi() {
        let levels = nrzi_encode(&[true, false, false, true, false]);
        assert_eq!(levels, vec![true, false, true, true, false]);
        assert_eq!(nrzi_decode(&levels), vec![true, false, false, true, false]);
    }

    #[test]
    fn test_ax25_frame_survives_hdlc() {
        let frame = Ax25Frame::ui(
            Callsign::new("APRS", 0).unwrap(),
            Callsign::new("DL1ABC", 1).unwrap(),
            b"Hello".to_vec(),
        );
        let bytes = frame.to_bytes().unwrap();
        let mut encoder = HdlcEncoder::new();
        let levels = nrzi_encode(&encoder.encode(&bytes).unwrap());
        let recovered = recover(&levels, DEFAULT_PREAMBLE_FLAGS);
        assert_eq!(recovered, bytes);
        assert_eq!(Ax25Frame::from_bytes(&recovered).unwrap(), frame);
    }

    #[quickcheck]
    fn prop_nrzi_and_stuffing_round_trip(data: Vec<u8>) -> bool {
        let mut encoder = HdlcEncoder::with_preamble(2);
        let levels = nrzi_encode(&encoder.encode(&data).unwrap());
        recover(&levels, 2) == data
    }

    #[quickcheck]
    fn prop_no_six_ones_inside_data(data: Vec<u8>) -> bool {
        let mut encoder = HdlcEncoder::with_preamble(0);
        let bits = encoder.encode(&data).unwrap();
        let body = &bits[8..bits.len() - 8];
        body.windows(6).all(|w| !w.iter().all(|&b| b))
    }
}
