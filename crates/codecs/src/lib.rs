//! rawsignal Codecs - table-driven tone generators
//!
//! Morse CW and DTMF have no framing state machine: a lookup table maps
//! each character to tones and gaps, which are rendered with the shared
//! phase oscillator from `rawsignal-core`.

pub mod cw;
pub mod dtmf;
pub mod error;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        cw::{CwConfig, CwGenerator, KeySegment, MorseElement},
        dtmf::{dtmf_frequencies, DtmfConfig, DtmfGenerator},
        error::{CodecError, Result},
    };
}
