//! Configuration file handling for rawsignal-tx

use anyhow::{Context, Result};
use rawsignal_codecs::cw::CwConfig;
use rawsignal_core::DEFAULT_SAMPLE_RATE;
use rawsignal_frame::ax25::SsidPolicy;
use rawsignal_frame::hdlc::DEFAULT_PREAMBLE_FLAGS;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::OutputFormat;

/// Settings shared by every subcommand. Command line flags win over
/// values loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub sample_rate: u32,
    pub ssid_policy: SsidPolicy,
    /// HDLC flags sent before an AX.25 frame
    pub preamble_flags: usize,
    /// Forces the output format instead of guessing from the file extension
    pub output_format: Option<OutputFormat>,
    pub tail: TailConfig,
    pub morse: MorseDefaults,
    pub dtmf: DtmfDefaults,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            ssid_policy: SsidPolicy::default(),
            preamble_flags: DEFAULT_PREAMBLE_FLAGS,
            output_format: None,
            tail: TailConfig::default(),
            morse: MorseDefaults::default(),
            dtmf: DtmfDefaults::default(),
        }
    }
}

/// Random silence appended after the encoded signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailConfig {
    pub enabled: bool,
    pub min_secs: u32,
    pub max_secs: u32,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_secs: 1,
            max_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorseDefaults {
    pub wpm: u32,
    pub tone_frequency: f64,
}

impl Default for MorseDefaults {
    fn default() -> Self {
        Self {
            wpm: CwConfig::DEFAULT_WPM,
            tone_frequency: CwConfig::DEFAULT_TONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtmfDefaults {
    pub tone_ms: u32,
    pub pause_ms: u32,
}

impl Default for DtmfDefaults {
    fn default() -> Self {
        Self {
            tone_ms: 50,
            pause_ms: 50,
        }
    }
}

impl ToolConfig {
    /// Reject values no encoder could use
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            anyhow::bail!("sample rate must be positive");
        }
        if self.tail.min_secs > self.tail.max_secs {
            anyhow::bail!(
                "tail minimum {} s exceeds maximum {} s",
                self.tail.min_secs,
                self.tail.max_secs
            );
        }
        if !(1..=CwConfig::MAX_WPM).contains(&self.morse.wpm) {
            anyhow::bail!("morse wpm {} outside 1..={}", self.morse.wpm, CwConfig::MAX_WPM);
        }
        if self.dtmf.tone_ms == 0 || self.dtmf.pause_ms == 0 {
            anyhow::bail!("DTMF tone and pause must be positive");
        }
        Ok(())
    }
}

/// Load configuration from file, trying JSON first, then TOML
pub fn load_config<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    if let Ok(config) = serde_json::from_str(&content) {
        return Ok(config);
    }

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Save configuration to file, as JSON for a `.json` path and TOML otherwise
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::to_string_pretty(config).context("Failed to serialize config")?
    } else {
        toml::to_string_pretty(config).context("Failed to serialize config")?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}
