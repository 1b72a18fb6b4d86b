//! rawsignal Modem - bit and word synthesizers
//!
//! Turns the logical bit streams and codeword sequences produced by
//! `rawsignal-frame` into signed 16-bit PCM:
//! - continuous-phase tone keying for AFSK1200 and plain FSK
//! - rectangular two-level symbols resampled to the output rate for POCSAG
//!
//! Every encode call allocates its output at the exact final length before
//! the first sample is written.

pub mod afsk;
pub mod common;
pub mod error;
pub mod fsk;
pub mod pocsag;

pub use error::{ModemError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        afsk::{encode_ax25, AfskConfig, AfskModulator, Ax25Options},
        common::{FskKeyer, ModulationConfig, Modulator, NrziKeyer, ToneKeyer, TonePair},
        error::{ModemError, Result},
        fsk::{encode_fsk9600, encode_ufsk1200, FskConfig, FskModulator},
        pocsag::{encode_pcm, encode_pocsag, pcm_length, SYMBOL_RATE},
    };
}
