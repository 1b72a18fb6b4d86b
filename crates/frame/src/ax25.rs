//! AX.25 UI frame assembly
//!
//! ```text
//! | Dest Addr (7) | Src Addr (7) | Control (1) | PID (1) | Info (N) | FCS (2) |
//! ```
//!
//! Address characters are ASCII shifted left by one bit. The seventh
//! address byte carries the SSID in bits 1-4 and the end-of-address
//! marker in bit 0, which is set only on the last address of the frame.
//! The FCS is CRC-16/CCITT over every preceding byte, low byte first.

use crate::crc::{crc16_ccitt, verify_fcs};
use crate::{FrameError, Result};
use rawsignal_core::buffer::try_with_capacity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Length of one encoded address field
pub const ADDRESS_LEN: usize = 7;

/// Characters in the callsign part of an address
pub const CALLSIGN_LEN: usize = 6;

/// Unnumbered Information frame
pub const CONTROL_UI: u8 = 0x03;

/// No layer 3 protocol
pub const PID_NO_LAYER3: u8 = 0xF0;

/// Bytes before the information field
pub const HEADER_LEN: usize = 2 * ADDRESS_LEN + 2;

/// Trailing frame check sequence bytes
pub const FCS_LEN: usize = 2;

/// Reserved SSID bits, always set
const SSID_RESERVED: u8 = 0x60;

/// What to do with an SSID outside 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SsidPolicy {
    /// Replace it with 0 and log a warning
    Clamp,
    /// Refuse the callsign
    #[default]
    Reject,
}

/// Station address: six-character callsign plus SSID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsign {
    base: [u8; CALLSIGN_LEN],
    ssid: u8,
}

impl Callsign {
    pub const MAX_SSID: u8 = 15;

    /// Build a callsign from its parts.
    ///
    /// The base is upper-cased, characters other than ASCII letters and
    /// digits become spaces, and the result is cut or padded to six.
    pub fn new(base: &str, ssid: u8) -> Result<Self> {
        if ssid > Self::MAX_SSID {
            return Err(FrameError::InvalidAddress {
                msg: format!("SSID {} out of range 0-{}", ssid, Self::MAX_SSID),
            });
        }

        let mut encoded = [b' '; CALLSIGN_LEN];
        for (slot, ch) in encoded.iter_mut().zip(base.chars()) {
            if ch.is_ascii_alphanumeric() {
                *slot = ch.to_ascii_uppercase() as u8;
            }
        }

        Ok(Self {
            base: encoded,
            ssid,
        })
    }

    /// Parse `CALL` or `CALL-SSID`
    pub fn parse(text: &str, policy: SsidPolicy) -> Result<Self> {
        let (base, ssid_text) = match text.rsplit_once('-') {
            Some((base, ssid)) => (base, Some(ssid)),
            None => (text, None),
        };

        let ssid = match ssid_text {
            None => 0,
            Some(raw) => match raw.parse::<u8>() {
                Ok(ssid) if ssid <= Self::MAX_SSID => ssid,
                _ => match policy {
                    SsidPolicy::Clamp => {
                        warn!("SSID '{}' in '{}' out of range, using 0", raw, text);
                        0
                    }
                    SsidPolicy::Reject => {
                        return Err(FrameError::InvalidAddress {
                            msg: format!("SSID '{}' in '{}' is not 0-{}", raw, text, Self::MAX_SSID),
                        })
                    }
                },
            },
        };

        Self::new(base, ssid)
    }

    /// Callsign without padding
    pub fn base(&self) -> &str {
        std::str::from_utf8(&self.base).unwrap_or_default().trim_end()
    }

    pub fn ssid(&self) -> u8 {
        self.ssid
    }

    /// Encode into the seven on-air address bytes
    pub fn encode(&self, last: bool) -> [u8; ADDRESS_LEN] {
        let mut bytes = [0u8; ADDRESS_LEN];
        for (out, &ch) in bytes.iter_mut().zip(self.base.iter()) {
            *out = ch << 1;
        }
        bytes[CALLSIGN_LEN] = SSID_RESERVED | (self.ssid << 1) | u8::from(last);
        bytes
    }

    /// Decode seven address bytes, returning the end-of-address marker too
    pub fn decode(bytes: &[u8]) -> Result<(Self, bool)> {
        if bytes.len() < ADDRESS_LEN {
            return Err(FrameError::SizeMismatch {
                expected: ADDRESS_LEN,
                actual: bytes.len(),
            });
        }

        let mut base = [b' '; CALLSIGN_LEN];
        for (slot, &b) in base.iter_mut().zip(bytes.iter()) {
            *slot = b >> 1;
        }
        let ssid_byte = bytes[CALLSIGN_LEN];

        Ok((
            Self {
                base,
                ssid: (ssid_byte >> 1) & 0x0F,
            },
            ssid_byte & 0x01 != 0,
        ))
    }
}

impl FromStr for Callsign {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, SsidPolicy::Reject)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid > 0 {
            write!(f, "{}-{}", self.base(), self.ssid)
        } else {
            write!(f, "{}", self.base())
        }
    }
}

/// AX.25 frame without digipeater path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ax25Frame {
    pub dest: Callsign,
    pub source: Callsign,
    pub control: u8,
    pub pid: u8,
    pub info: Vec<u8>,
}

impl Ax25Frame {
    /// Unnumbered Information frame with no layer 3 protocol
    pub fn ui(dest: Callsign, source: Callsign, info: impl Into<Vec<u8>>) -> Self {
        Self {
            dest,
            source,
            control: CONTROL_UI,
            pid: PID_NO_LAYER3,
            info: info.into(),
        }
    }

    /// Encoded size including the FCS
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.info.len() + FCS_LEN
    }

    /// Serialize to on-air bytes, FCS appended low byte first
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = try_with_capacity(self.encoded_len(), "AX.25 frame")?;
        self.write_body(&mut bytes);
        let fcs = crc16_ccitt(&bytes);
        bytes.extend_from_slice(&fcs.to_le_bytes());
        Ok(bytes)
    }

    /// Frame check sequence over the header and information field
    pub fn fcs(&self) -> u16 {
        let mut body = Vec::with_capacity(HEADER_LEN + self.info.len());
        self.write_body(&mut body);
        crc16_ccitt(&body)
    }

    fn write_body(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.dest.encode(false));
        bytes.extend_from_slice(&self.source.encode(true));
        bytes.push(self.control);
        bytes.push(self.pid);
        bytes.extend_from_slice(&self.info);
    }

    /// Parse on-air bytes, checking the FCS
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + FCS_LEN {
            return Err(FrameError::InvalidFormat {
                msg: format!("Frame too short: {} bytes", bytes.len()),
            });
        }

        if !verify_fcs(bytes) {
            let body_len = bytes.len() - FCS_LEN;
            return Err(FrameError::FcsMismatch {
                computed: crc16_ccitt(&bytes[..body_len]),
                received: u16::from_le_bytes([bytes[body_len], bytes[body_len + 1]]),
            });
        }

        let (dest, dest_last) = Callsign::decode(&bytes[..ADDRESS_LEN])?;
        let (source, source_last) = Callsign::decode(&bytes[ADDRESS_LEN..2 * ADDRESS_LEN])?;
        if dest_last || !source_last {
            return Err(FrameError::InvalidFormat {
                msg: "Digipeater paths are not supported".to_string(),
            });
        }

        Ok(Self {
            dest,
            source,
            control: bytes[2 * ADDRESS_LEN],
            pid: bytes[2 * ADDRESS_LEN + 1],
            info: bytes[HEADER_LEN..bytes.len() - FCS_LEN].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_ssid() {
        let call = Callsign::parse("dl1abc-1", SsidPolicy::Reject).unwrap();
        assert_eq!(call.base(), "DL1ABC");
        assert_eq!(call.ssid(), 1);
        assert_eq!(call.to_string(), "DL1ABC-1");
    }

    #[test]
    fn test_parse_pads_and_truncates() {
        let short: Callsign = "APRS".parse().unwrap();
        assert_eq!(short.encode(false), [0x82, 0xA0, 0xA4, 0xA6, 0x40, 0x40, 0x60]);

        let long = Callsign::parse("ABCDEFGH", SsidPolicy::Reject).unwrap();
        assert_eq!(long.base(), "ABCDEF");
    }

    #[test]
    fn test_unsupported_characters_become_spaces() {
        let call = Callsign::new("a/b", 0).unwrap();
        assert_eq!(call.encode(false)[..3], [b'A' << 1, b' ' << 1, b'B' << 1]);
    }

    #[test]
    fn test_ssid_policy() {
        assert!(Callsign::parse("N0CALL-16", SsidPolicy::Reject).is_err());
        assert!(Callsign::parse("N0CALL-X", SsidPolicy::Reject).is_err());

        let clamped = Callsign::parse("N0CALL-16", SsidPolicy::Clamp).unwrap();
        assert_eq!(clamped.ssid(), 0);
        assert_eq!(clamped.base(), "N0CALL");

        assert!(Callsign::new("N0CALL", 16).is_err());
    }

    #[test]
    fn test_ssid_and_last_bit_encoding() {
        let call = Callsign::new("N0CALL", 15).unwrap();
        assert_eq!(call.encode(false)[6], 0x60 | 0x1E);
        assert_eq!(call.encode(true)[6], 0x60 | 0x1E | 0x01);
    }

    #[test]
    fn test_ui_frame_layout() {
        let dest: Callsign = "APRS".parse().unwrap();
        let source: Callsign = "DL1ABC-1".parse().unwrap();
        let frame = Ax25Frame::ui(dest, source, b"Hello".to_vec());
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(bytes.len(), frame.encoded_len());
        assert_eq!(&bytes[..7], &[0x82, 0xA0, 0xA4, 0xA6, 0x40, 0x40, 0x60]);
        assert_eq!(&bytes[7..14], &[0x88, 0x98, 0x62, 0x82, 0x84, 0x86, 0x63]);
        assert_eq!(bytes[14], CONTROL_UI);
        assert_eq!(bytes[15], PID_NO_LAYER3);
        assert_eq!(&bytes[16..21], b"Hello");

        let fcs = crc16_ccitt(&bytes[..21]);
        assert_eq!(bytes[21], (fcs & 0xFF) as u8);
        assert_eq!(bytes[22], (fcs >> 8) as u8);
        assert_eq!(frame.fcs(), fcs);
    }

    #[test]
    fn test_frame_round_trip() {
        let frame = Ax25Frame::ui(
            "CQ".parse().unwrap(),
            "N0CALL-7".parse().unwrap(),
            b"test 123".to_vec(),
        );
        let parsed = Ax25Frame::from_bytes(&frame.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_corrupted_frame_rejected() {
        let frame = Ax25Frame::ui("CQ".parse().unwrap(), "N0CALL".parse().unwrap(), b"x".to_vec());
        let mut bytes = frame.to_bytes().unwrap();
        bytes[16] ^= 0x20;
        assert!(matches!(
            Ax25Frame::from_bytes(&bytes),
            Err(FrameError::FcsMismatch { .. })
        ));
        assert!(Ax25Frame::from_bytes(&bytes[..10]).is_err());
    }
}
