//! Logging, output sinks and trailing silence shared by the tools

use anyhow::{Context, Result};
use rand::Rng;
use rawsignal_core::buffer::PcmBuffer;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Initialize logging on stderr, leaving stdout free for PCM
pub fn init_logging(verbose: bool, debug: bool) {
    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Container for written samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Headerless signed 16-bit little-endian
    Raw,
    Wav,
}

impl OutputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => OutputFormat::Wav,
            _ => OutputFormat::Raw,
        }
    }
}

/// Write `pcm` to `path`, or as raw samples to stdout when no path is given.
///
/// `format` overrides the extension-based guess.
pub fn write_output(pcm: &PcmBuffer, path: Option<&Path>, format: Option<OutputFormat>) -> Result<()> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&pcm.to_le_bytes())
            .context("Failed to write samples to stdout")?;
        stdout.flush()?;
        debug!(samples = pcm.len(), "Wrote raw samples to stdout");
        return Ok(());
    };

    match format.unwrap_or_else(|| OutputFormat::from_path(path)) {
        OutputFormat::Wav => write_wav_file(pcm, path),
        OutputFormat::Raw => {
            std::fs::write(path, pcm.to_le_bytes())
                .with_context(|| format!("Failed to write raw file: {:?}", path))?;
            info!("Wrote {} samples to {:?}", pcm.len(), path);
            Ok(())
        }
    }
}

/// Write mono 16-bit WAV
fn write_wav_file(pcm: &PcmBuffer, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: pcm.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    for &sample in pcm.samples() {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    info!("Wrote {} samples to {:?}", pcm.len(), path);
    Ok(())
}

/// Pick a silence length between `min_secs` inclusive and `max_secs`
/// exclusive, at whole-sample resolution
pub fn tail_samples<R: Rng + ?Sized>(rng: &mut R, sample_rate: u32, min_secs: u32, max_secs: u32) -> usize {
    let min = sample_rate as usize * min_secs as usize;
    let max = sample_rate as usize * max_secs as usize;
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Copy `pcm` into a new buffer followed by `tail` zero samples
pub fn append_tail(pcm: &PcmBuffer, tail: usize) -> Result<PcmBuffer> {
    let mut out = PcmBuffer::with_exact_capacity(pcm.len() + tail, pcm.sample_rate())?;
    out.extend_from_slice(pcm.samples())?;
    out.extend_silence(tail)?;
    debug!(samples = tail, "Trailing silence appended");
    Ok(out.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_output_format_detection() {
        assert_eq!(OutputFormat::from_path(&PathBuf::from("page.wav")), OutputFormat::Wav);
        assert_eq!(OutputFormat::from_path(&PathBuf::from("PAGE.WAV")), OutputFormat::Wav);
        assert_eq!(OutputFormat::from_path(&PathBuf::from("page.raw")), OutputFormat::Raw);
        assert_eq!(OutputFormat::from_path(&PathBuf::from("page")), OutputFormat::Raw);
    }

    #[test]
    fn test_wav_round_trip() {
        let pcm = PcmBuffer::from_samples(vec![0, 100, -100, 16383, -16383], 22050).unwrap();
        let temp_file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        write_output(&pcm, Some(temp_file.path()), None).unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, pcm.samples());
    }

    #[test]
    fn test_raw_file() {
        let pcm = PcmBuffer::from_samples(vec![1, -2], 8000).unwrap();
        let temp_file = NamedTempFile::new().unwrap();
        write_output(&pcm, Some(temp_file.path()), None).unwrap();
        let bytes = std::fs::read(temp_file.path()).unwrap();
        assert_eq!(bytes, vec![0x01, 0x00, 0xFE, 0xFF]);
    }

    #[test]
    fn test_format_override() {
        let pcm = PcmBuffer::from_samples(vec![7; 8], 8000).unwrap();
        let temp_file = NamedTempFile::new().unwrap();
        write_output(&pcm, Some(temp_file.path()), Some(OutputFormat::Wav)).unwrap();
        let reader = hound::WavReader::open(temp_file.path()).unwrap();
        assert_eq!(reader.len(), 8);
    }

    #[test]
    fn test_tail_samples_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let tail = tail_samples(&mut rng, 22050, 1, 10);
            assert!((22050..220500).contains(&tail));
        }
        assert_eq!(tail_samples(&mut rng, 8000, 2, 2), 16000);
    }

    #[test]
    fn test_append_tail() {
        let pcm = PcmBuffer::from_samples(vec![5, 6, 7], 8000).unwrap();
        let out = append_tail(&pcm, 4).unwrap();
        assert_eq!(out.samples(), &[5, 6, 7, 0, 0, 0, 0]);
        assert_eq!(out.sample_rate(), 8000);
    }
}
