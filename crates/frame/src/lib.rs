//! rawsignal Frame - protocol framing for packet and paging modes
//!
//! This crate turns messages into the exact bit or word sequences a
//! receiver expects: AX.25 UI frames carried in HDLC (flags, bit
//! stuffing, CRC-16 FCS) and POCSAG batches (sync, address and message
//! codewords with BCH check bits and even parity).

pub mod ax25;
pub mod crc;
pub mod error;
pub mod hdlc;
pub mod pocsag;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ax25::{Ax25Frame, Callsign, SsidPolicy},
        crc::{crc16_ccitt, encode_codeword, even_parity, pocsag_crc},
        error::{FrameError, Result},
        hdlc::HdlcEncoder,
        pocsag::{FunctionCode, PocsagAddress, TransmissionLayout},
    };
}
