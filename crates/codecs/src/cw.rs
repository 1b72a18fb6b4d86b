//! CW (Morse Code) generation
//!
//! Timing in dot units: dit 1, dah 3, gap inside a character 1, gap after
//! a character 3, gap for a space 7. The final 3 units of trailing
//! silence are dropped.

use crate::{CodecError, Result};
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_core::oscillator::PhaseOscillator;
use rawsignal_core::{DEFAULT_SAMPLE_RATE, MAX_PCM_VALUE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Seconds per dot at 1 WPM ("PARIS" = 50 dot units)
const DOT_SECONDS_AT_1_WPM: f64 = 1.2;

/// Morse code timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CwConfig {
    /// Words per minute (WPM)
    pub wpm: u32,

    /// CW tone frequency in Hz
    pub tone_frequency: f64,

    pub sample_rate: u32,
}

impl CwConfig {
    pub const DEFAULT_WPM: u32 = 20;
    pub const MAX_WPM: u32 = 60;
    pub const DEFAULT_TONE: f64 = 700.0;

    /// Create standard CW configuration
    pub fn new(wpm: u32, tone_frequency: f64, sample_rate: u32) -> Result<Self> {
        if !(1..=Self::MAX_WPM).contains(&wpm) {
            return Err(CodecError::InvalidParameters {
                msg: format!("WPM must be 1-{}, got {}", Self::MAX_WPM, wpm),
            });
        }
        if sample_rate == 0 || !(tone_frequency > 0.0 && tone_frequency < sample_rate as f64 / 2.0)
        {
            return Err(CodecError::InvalidParameters {
                msg: format!("tone {} Hz unusable at {} Hz", tone_frequency, sample_rate),
            });
        }

        Ok(Self {
            wpm,
            tone_frequency,
            sample_rate,
        })
    }

    /// Standard 700 Hz tone at the default sample rate
    pub fn with_wpm(wpm: u32) -> Result<Self> {
        Self::new(wpm, Self::DEFAULT_TONE, DEFAULT_SAMPLE_RATE)
    }

    /// Calculate dot length in seconds
    pub fn dot_length_seconds(&self) -> f64 {
        DOT_SECONDS_AT_1_WPM / self.wpm as f64
    }

    /// Dot length in whole samples
    pub fn dot_samples(&self) -> usize {
        (self.sample_rate as f64 * self.dot_length_seconds()).round() as usize
    }
}

/// Morse code element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseElement {
    Dot,
    Dash,
    ElementSpace,
    CharacterSpace,
    WordSpace,
}

impl MorseElement {
    /// Duration in dot units
    pub fn units(self) -> usize {
        match self {
            MorseElement::Dot | MorseElement::ElementSpace => 1,
            MorseElement::Dash | MorseElement::CharacterSpace => 3,
            MorseElement::WordSpace => 7,
        }
    }

    pub fn is_tone(self) -> bool {
        matches!(self, MorseElement::Dot | MorseElement::Dash)
    }
}

/// A run of key-down or key-up time, in dot units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySegment {
    pub keyed: bool,
    pub units: usize,
}

/// Morse code generator
pub struct CwGenerator {
    config: CwConfig,
    morse_table: HashMap<char, Vec<MorseElement>>,
}

impl CwGenerator {
    /// Create a new CW generator
    pub fn new(config: CwConfig) -> Self {
        let mut generator = Self {
            config,
            morse_table: HashMap::new(),
        };
        generator.init_morse_table();
        generator
    }

    pub fn config(&self) -> &CwConfig {
        &self.config
    }

    /// Initialize the Morse code lookup table
    fn init_morse_table(&mut self) {
        use MorseElement::*;

        // Letters
        self.morse_table.insert('A', vec![Dot, Dash]);
        self.morse_table.insert('B', vec![Dash, Dot, Dot, Dot]);
        self.morse_table.insert('C', vec![Dash, Dot, Dash, Dot]);
        self.morse_table.insert('D', vec![Dash, Dot, Dot]);
        self.morse_table.insert('E', vec![Dot]);
        self.morse_table.insert('F', vec![Dot, Dot, Dash, Dot]);
        self.morse_table.insert('G', vec![Dash, Dash, Dot]);
        self.morse_table.insert('H', vec![Dot, Dot, Dot, Dot]);
        self.morse_table.insert('I', vec![Dot, Dot]);
        self.morse_table.insert('J', vec![Dot, Dash, Dash, Dash]);
        self.morse_table.insert('K', vec![Dash, Dot, Dash]);
        self.morse_table.insert('L', vec![Dot, Dash, Dot, Dot]);
        self.morse_table.insert('M', vec![Dash, Dash]);
        self.morse_table.insert('N', vec![Dash, Dot]);
        self.morse_table.insert('O', vec![Dash, Dash, Dash]);
        self.morse_table.insert('P', vec![Dot, Dash, Dash, Dot]);
        self.morse_table.insert('Q', vec![Dash, Dash, Dot, Dash]);
        self.morse_table.insert('R', vec![Dot, Dash, Dot]);
        self.morse_table.insert('S', vec![Dot, Dot, Dot]);
        self.morse_table.insert('T', vec![Dash]);
        self.morse_table.insert('U', vec![Dot, Dot, Dash]);
        self.morse_table.insert('V', vec![Dot, Dot, Dot, Dash]);
        self.morse_table.insert('W', vec![Dot, Dash, Dash]);
        self.morse_table.insert('X', vec![Dash, Dot, Dot, Dash]);
        self.morse_table.insert('Y', vec![Dash, Dot, Dash, Dash]);
        self.morse_table.insert('Z', vec![Dash, Dash, Dot, Dot]);

        // Numbers
        self.morse_table.insert('0', vec![Dash, Dash, Dash, Dash, Dash]);
        self.morse_table.insert('1', vec![Dot, Dash, Dash, Dash, Dash]);
        self.morse_table.insert('2', vec![Dot, Dot, Dash, Dash, Dash]);
        self.morse_table.insert('3', vec![Dot, Dot, Dot, Dash, Dash]);
        self.morse_table.insert('4', vec![Dot, Dot, Dot, Dot, Dash]);
        self.morse_table.insert('5', vec![Dot, Dot, Dot, Dot, Dot]);
        self.morse_table.insert('6', vec![Dash, Dot, Dot, Dot, Dot]);
        self.morse_table.insert('7', vec![Dash, Dash, Dot, Dot, Dot]);
        self.morse_table.insert('8', vec![Dash, Dash, Dash, Dot, Dot]);
        self.morse_table.insert('9', vec![Dash, Dash, Dash, Dash, Dot]);

        // Punctuation
        self.morse_table.insert('.', vec![Dot, Dash, Dot, Dash, Dot, Dash]);
        self.morse_table.insert(',', vec![Dash, Dash, Dot, Dot, Dash, Dash]);
        self.morse_table.insert('?', vec![Dot, Dot, Dash, Dash, Dot, Dot]);
        self.morse_table.insert('/', vec![Dash, Dot, Dot, Dash, Dot]);
    }

    /// Whether `ch` has a Morse code
    pub fn supports(&self, ch: char) -> bool {
        self.morse_table.contains_key(&ch.to_ascii_uppercase())
    }

    /// Convert text to morse elements.
    ///
    /// Every known character is followed by a character space; runs of
    /// spaces become one word space. Unknown characters are skipped.
    pub fn text_to_morse(&self, text: &str) -> Vec<MorseElement> {
        let mut elements = Vec::new();
        let mut previous_was_space = true;

        for ch in text.chars() {
            if ch == ' ' {
                if !previous_was_space {
                    elements.push(MorseElement::WordSpace);
                }
                previous_was_space = true;
                continue;
            }
            previous_was_space = false;

            let Some(code) = self.morse_table.get(&ch.to_ascii_uppercase()) else {
                warn!(character = ?ch, "No Morse code, skipping");
                continue;
            };
            for (i, element) in code.iter().enumerate() {
                if i > 0 {
                    elements.push(MorseElement::ElementSpace);
                }
                elements.push(*element);
            }
            elements.push(MorseElement::CharacterSpace);
        }

        elements
    }

    /// Collapse elements into alternating key-down and key-up runs, with
    /// the trailing character gap removed
    pub fn key_plan(&self, text: &str) -> Vec<KeySegment> {
        let mut plan: Vec<KeySegment> = Vec::new();
        for element in self.text_to_morse(text) {
            let keyed = element.is_tone();
            match plan.last_mut() {
                Some(last) if last.keyed == keyed => last.units += element.units(),
                _ => plan.push(KeySegment {
                    keyed,
                    units: element.units(),
                }),
            }
        }

        if let Some(last) = plan.last_mut() {
            if !last.keyed {
                last.units = last
                    .units
                    .saturating_sub(MorseElement::CharacterSpace.units());
                if last.units == 0 {
                    plan.pop();
                }
            }
        }
        plan
    }

    /// Samples [`CwGenerator::generate`] produces for `text`
    pub fn message_length(&self, text: &str) -> usize {
        let units: usize = self.key_plan(text).iter().map(|s| s.units).sum();
        units * self.config.dot_samples()
    }

    /// Render `text` as keyed tone.
    ///
    /// Fails when no character in `text` has a Morse code.
    pub fn generate(&self, text: &str) -> Result<PcmBuffer> {
        let plan = self.key_plan(text);
        if !plan.iter().any(|s| s.keyed) {
            return Err(CodecError::EncodingFailed {
                msg: format!("nothing to send in {:?}", text),
            });
        }

        let dot = self.config.dot_samples();
        let len = plan.iter().map(|s| s.units).sum::<usize>() * dot;
        let mut out = PcmBuffer::with_exact_capacity(len, self.config.sample_rate)?;
        let mut oscillator = PhaseOscillator::new(self.config.sample_rate, MAX_PCM_VALUE)?;

        for segment in &plan {
            let count = segment.units * dot;
            if segment.keyed {
                oscillator.emit(self.config.tone_frequency, count, &mut out)?;
            } else {
                out.extend_silence(count)?;
            }
        }
        debug!(segments = plan.len(), dot_samples = dot, "CW key plan rendered");

        let pcm = out.finish()?;
        info!(
            wpm = self.config.wpm,
            samples = pcm.len(),
            seconds = pcm.duration_secs(),
            "CW message encoded"
        );
        Ok(pcm)
    }
}
