//! Checksums: CRC-16/CCITT frame check, POCSAG BCH(31,21) check bits, parity

/// CRC-16/CCITT polynomial (MSB-first form)
pub const CRC16_CCITT_POLY: u16 = 0x1021;

/// Initial CRC-16 register value
pub const CRC16_INIT: u16 = 0xFFFF;

/// Value left in the register after a message followed by its own CRC,
/// high byte first, has been run through [`crc16_ccitt`].
pub const CRC16_RESIDUE: u16 = 0xE2F0;

/// POCSAG BCH generator: x^10 + x^9 + x^8 + x^6 + x^5 + x^3 + 1
pub const POCSAG_GENERATOR: u32 = 0b111_0110_1001;

/// Number of BCH check bits in a POCSAG codeword
pub const POCSAG_CRC_BITS: u32 = 10;

/// Mask for the 21 flag+data bits of a codeword
pub const CODEWORD_DATA_MASK: u32 = 0x1F_FFFF;

/// CRC-16/CCITT, MSB first, inverted result.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_CCITT_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    !crc
}

/// Check a frame whose last two bytes are its FCS, low byte first
pub fn verify_fcs(frame: &[u8]) -> bool {
    match frame.len().checked_sub(2) {
        Some(body_len) => {
            let received = u16::from_le_bytes([frame[body_len], frame[body_len + 1]]);
            crc16_ccitt(&frame[..body_len]) == received
        }
        None => false,
    }
}

/// BCH check bits for a 21-bit flag+data field.
///
/// Long division of `msg << 10` by the generator, one column per input
/// bit, most significant first.
pub fn pocsag_crc(msg: u32) -> u32 {
    let mut denominator = POCSAG_GENERATOR << 20;
    let mut remainder = (msg & CODEWORD_DATA_MASK) << POCSAG_CRC_BITS;

    for column in 0..=20 {
        if (remainder >> (30 - column)) & 1 != 0 {
            remainder ^= denominator;
        }
        denominator >>= 1;
    }
    remainder & 0x3FF
}

/// Even parity bit of `x`: 1 when the number of set bits is odd
pub fn even_parity(x: u32) -> u32 {
    x.count_ones() & 1
}

/// Append check bits and parity to a 21-bit flag+data field
pub fn encode_codeword(msg: u32) -> u32 {
    let msg = msg & CODEWORD_DATA_MASK;
    let with_crc = (msg << POCSAG_CRC_BITS) | pocsag_crc(msg);
    (with_crc << 1) | even_parity(with_crc)
}

/// Flag+data field of an encoded codeword
pub fn codeword_data(codeword: u32) -> u32 {
    codeword >> (POCSAG_CRC_BITS + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16_ccitt(b"123456789"), 0xD64E);
        assert_eq!(crc16_ccitt(b""), 0x0000);
    }

    #[test]
    fn test_verify_fcs() {
        let mut frame = b"Hello".to_vec();
        let fcs = crc16_ccitt(&frame);
        frame.extend_from_slice(&fcs.to_le_bytes());
        assert!(verify_fcs(&frame));

        frame[0] ^= 0x01;
        assert!(!verify_fcs(&frame));
        assert!(!verify_fcs(&[0x42]));
    }

    #[quickcheck]
    fn prop_crc16_residue(data: Vec<u8>) -> bool {
        let mut extended = data.clone();
        extended.extend_from_slice(&crc16_ccitt(&data).to_be_bytes());
        crc16_ccitt(&extended) == CRC16_RESIDUE
    }

    #[quickcheck]
    fn prop_fcs_low_byte_first_round_trip(data: Vec<u8>) -> bool {
        let mut frame = data.clone();
        frame.extend_from_slice(&crc16_ccitt(&data).to_le_bytes());
        verify_fcs(&frame)
    }

    #[test]
    fn test_idle_word_is_a_codeword() {
        let idle = 0x7A89_C197;
        assert_eq!(encode_codeword(codeword_data(idle)), idle);
    }

    #[test]
    fn test_known_codewords() {
        assert_eq!(encode_codeword(0), 0);
        assert_eq!(encode_codeword(CODEWORD_DATA_MASK), 0xFFFF_FFFF);
        // Address 1234567, function 3
        assert_eq!(encode_codeword(0x96B43), 0x4B5A_1A25);
    }

    #[test]
    fn test_crc_is_ten_bits() {
        for msg in [0, 1, 0x1234, 0x10_0000, CODEWORD_DATA_MASK] {
            assert!(pocsag_crc(msg) < (1 << POCSAG_CRC_BITS));
        }
    }

    #[quickcheck]
    fn prop_codeword_has_even_parity(msg: u32) -> bool {
        even_parity(encode_codeword(msg & CODEWORD_DATA_MASK)) == 0
    }

    #[quickcheck]
    fn prop_codeword_preserves_data(msg: u32) -> bool {
        let msg = msg & CODEWORD_DATA_MASK;
        codeword_data(encode_codeword(msg)) == msg
    }
}
