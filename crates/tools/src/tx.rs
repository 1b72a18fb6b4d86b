//! Command line surface of rawsignal-tx
//!
//! Every argument is validated while parsing, so encoding starts only
//! once the whole request is known to be usable. The signal is fully
//! rendered before anything reaches the output sink.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rawsignal_codecs::cw::{CwConfig, CwGenerator};
use rawsignal_codecs::dtmf::{DtmfConfig, DtmfGenerator};
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_frame::pocsag::{FunctionCode, PocsagAddress};
use rawsignal_modem::afsk::{encode_ax25, AfskConfig, Ax25Options};
use rawsignal_modem::fsk::{encode_fsk9600, encode_ufsk1200};
use rawsignal_modem::pocsag::{encode_pocsag, SUPPORTED_BAUD_RATES};
use std::path::PathBuf;
use tracing::info;

use crate::common::{append_tail, tail_samples, write_output};
use crate::config::ToolConfig;

/// Longest callsign accepted on the command line, SSID included
pub const MAX_CALLSIGN_LEN: usize = 10;

/// Baseband PCM generator for digital radio modes
#[derive(Parser, Debug)]
#[command(name = "rawsignal-tx")]
#[command(about = "Encode messages as signed 16-bit PCM for digital radio modes")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file (JSON or TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output file; `.wav` writes a WAV file, anything else raw S16LE.
    /// Raw samples go to stdout when omitted.
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Do not append random trailing silence
    #[arg(long, global = true)]
    pub no_tail: bool,

    /// Output sample rate in Hz
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_rate: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// POCSAG page: ADDR:MSG or ADDR:FUNC:MSG
    Pocsag {
        /// 512, 1200 or 2400
        #[arg(long, default_value_t = 512, value_parser = parse_baud)]
        baud: u32,

        #[arg(value_parser = parse_page)]
        page: Page,
    },
    /// AX.25 UI frame over Bell 202 AFSK
    Afsk1200 {
        /// Source callsign, CALL or CALL-SSID
        #[arg(value_parser = parse_callsign)]
        tx_call: String,

        /// Destination callsign, CALL or CALL-SSID
        #[arg(value_parser = parse_callsign)]
        dest_call: String,

        /// Information field
        message: Option<String>,
    },
    /// Unframed 9600 baud FSK
    Fsk9600 { message: String },
    /// Unframed 1200 baud FSK with bit-sync preamble
    Ufsk1200 { message: String },
    /// Morse CW
    Morse {
        message: String,

        /// Words per minute, 1 to 60
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
        wpm: Option<u32>,
    },
    /// DTMF digit sequence
    Dtmf {
        digits: String,

        /// Tone duration per digit in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tone_ms: Option<u32>,

        /// Silence after each digit in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        pause_ms: Option<u32>,
    },
    /// Show supported modes
    Info,
}

/// A parsed POCSAG page argument
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub address: PocsagAddress,
    pub function: FunctionCode,
    pub message: String,
}

/// Parse `ADDR:MSG` or `ADDR:FUNC:MSG`.
///
/// A middle field is only taken as the function code when it is all
/// digits, so `123:re: lunch` keeps its colons in the message.
pub fn parse_page(text: &str) -> std::result::Result<Page, String> {
    let (address, rest) = text
        .split_once(':')
        .ok_or_else(|| format!("expected ADDR:MSG or ADDR:FUNC:MSG, got {:?}", text))?;

    let address: u32 = address
        .trim()
        .parse()
        .map_err(|_| format!("invalid address {:?}", address))?;
    let address = PocsagAddress::try_from(address).map_err(|e| e.to_string())?;

    let (function, message) = match rest.split_once(':') {
        Some((func, message)) if !func.is_empty() && func.bytes().all(|b| b.is_ascii_digit()) => {
            let code: u8 = func
                .parse()
                .map_err(|_| format!("invalid function code {:?}", func))?;
            let function = FunctionCode::try_from(code).map_err(|e| e.to_string())?;
            (function, message)
        }
        _ => (FunctionCode::default(), rest),
    };

    if message.is_empty() {
        return Err("message is empty".to_string());
    }

    Ok(Page {
        address,
        function,
        message: message.to_string(),
    })
}

pub fn parse_baud(text: &str) -> std::result::Result<u32, String> {
    let baud: u32 = text
        .parse()
        .map_err(|_| format!("invalid baud rate {:?}", text))?;
    if !SUPPORTED_BAUD_RATES.contains(&baud) {
        return Err(format!("baud rate must be one of {:?}", SUPPORTED_BAUD_RATES));
    }
    Ok(baud)
}

pub fn parse_callsign(text: &str) -> std::result::Result<String, String> {
    if text.is_empty() {
        return Err("callsign is empty".to_string());
    }
    if text.chars().count() > MAX_CALLSIGN_LEN {
        return Err(format!(
            "callsign {:?} longer than {} characters",
            text, MAX_CALLSIGN_LEN
        ));
    }
    Ok(text.to_string())
}

/// Render `command` at `sample_rate`
pub fn encode(command: &Commands, config: &ToolConfig, sample_rate: u32) -> Result<PcmBuffer> {
    let pcm = match command {
        Commands::Pocsag { baud, page } => {
            info!(
                address = %page.address,
                function = ?page.function,
                baud,
                "POCSAG encoding"
            );
            encode_pocsag(
                page.address,
                page.function,
                page.message.as_bytes(),
                *baud,
                sample_rate,
            )
            .context("POCSAG encoding failed")?
        }
        Commands::Afsk1200 {
            tx_call,
            dest_call,
            message,
        } => {
            let options = Ax25Options {
                sample_rate,
                preamble_flags: config.preamble_flags,
                ssid_policy: config.ssid_policy,
                afsk: AfskConfig::bell_202(),
            };
            let message = message.as_deref().unwrap_or_default();
            info!(from = %tx_call, to = %dest_call, "AFSK1200 encoding");
            encode_ax25(tx_call, dest_call, message.as_bytes(), &options)
                .context("AFSK1200 encoding failed")?
        }
        Commands::Fsk9600 { message } => {
            encode_fsk9600(message.as_bytes(), sample_rate).context("FSK9600 encoding failed")?
        }
        Commands::Ufsk1200 { message } => {
            encode_ufsk1200(message.as_bytes(), sample_rate).context("UFSK1200 encoding failed")?
        }
        Commands::Morse { message, wpm } => {
            let wpm = wpm.unwrap_or(config.morse.wpm);
            let cw = CwConfig::new(wpm, config.morse.tone_frequency, sample_rate)?;
            info!(wpm, "Morse encoding");
            CwGenerator::new(cw)
                .generate(message)
                .context("Morse encoding failed")?
        }
        Commands::Dtmf {
            digits,
            tone_ms,
            pause_ms,
        } => {
            let dtmf = DtmfConfig {
                tone_ms: tone_ms.unwrap_or(config.dtmf.tone_ms),
                pause_ms: pause_ms.unwrap_or(config.dtmf.pause_ms),
                sample_rate,
            };
            info!(tone_ms = dtmf.tone_ms, pause_ms = dtmf.pause_ms, "DTMF encoding");
            DtmfGenerator::new(dtmf)?
                .generate(digits)
                .context("DTMF encoding failed")?
        }
        Commands::Info => anyhow::bail!("info does not produce samples"),
    };
    Ok(pcm)
}

/// Execute a parsed command line
pub fn run(cli: &Cli, config: ToolConfig) -> Result<()> {
    if cli.command == Commands::Info {
        show_info();
        return Ok(());
    }

    let sample_rate = cli.sample_rate.unwrap_or(config.sample_rate);
    let pcm = encode(&cli.command, &config, sample_rate)?;

    let pcm = if config.tail.enabled && !cli.no_tail {
        let tail = tail_samples(
            &mut rand::thread_rng(),
            sample_rate,
            config.tail.min_secs,
            config.tail.max_secs,
        );
        append_tail(&pcm, tail)?
    } else {
        pcm
    };

    write_output(&pcm, cli.output.as_deref(), config.output_format)?;
    info!(
        samples = pcm.len(),
        seconds = pcm.duration_secs(),
        "Transmission complete"
    );
    Ok(())
}

/// Print supported modes
pub fn show_info() {
    println!("\n=== rawsignal-tx ===");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));

    println!("\n=== Supported Modes ===");
    println!("  • POCSAG   - 512/1200/2400 baud paging, numeric and alphanumeric");
    println!("  • AFSK1200 - AX.25 UI frames, Bell 202 tones 1200/2200 Hz");
    println!("  • FSK9600  - unframed bytes, 4800/8400 Hz");
    println!("  • UFSK1200 - unframed bytes with 20 bit preamble, 1200/2200 Hz");
    println!("  • Morse    - 700 Hz CW, 1-60 WPM");
    println!("  • DTMF     - 0-9 * # A-D");

    println!("\n=== Output ===");
    println!("  Signed 16-bit mono PCM, raw to stdout or a .raw/.wav file");

    println!("\n=== Example Usage ===");
    println!("  rawsignal-tx pocsag --baud 1200 1234567:3:HALLO > page.raw");
    println!("  rawsignal-tx afsk1200 DL1ABC-1 APRS 'Hello' -o packet.wav");
    println!("  rawsignal-tx morse CQDX --wpm 25 --no-tail");
    println!("  rawsignal-tx dtmf 123456# --tone-ms 80");
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rawsignal_frame::pocsag::message_length;
    use rawsignal_modem::pocsag::pcm_length;

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["rawsignal-tx"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn rejects(args: &[&str]) -> bool {
        let mut argv = vec!["rawsignal-tx"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).is_err()
    }

    #[test]
    fn test_parse_page_with_function() {
        let page = parse_page("1234567:3:HALLO").unwrap();
        assert_eq!(page.address.value(), 1234567);
        assert_eq!(page.function, FunctionCode::Alphanumeric);
        assert_eq!(page.message, "HALLO");

        let page = parse_page("8:0:123").unwrap();
        assert_eq!(page.function, FunctionCode::Numeric);
    }

    #[test]
    fn test_parse_page_default_function() {
        let page = parse_page("42:Hello").unwrap();
        assert_eq!(page.address.value(), 42);
        assert_eq!(page.function, FunctionCode::Alphanumeric);
        assert_eq!(page.message, "Hello");
    }

    #[test]
    fn test_parse_page_keeps_colons() {
        let page = parse_page("42:re: lunch").unwrap();
        assert_eq!(page.message, "re: lunch");

        let page = parse_page("42:1:a:b").unwrap();
        assert_eq!(page.message, "a:b");
    }

    #[test]
    fn test_parse_page_errors() {
        assert!(parse_page("HALLO").is_err());
        assert!(parse_page("abc:HALLO").is_err());
        assert!(parse_page("2097152:HALLO").is_err());
        assert!(parse_page("2097151:HALLO").is_ok());
        assert!(parse_page("1:4:HALLO").is_err());
        assert!(parse_page("1:3:").is_err());
        assert!(parse_page("1:").is_err());
    }

    #[test]
    fn test_cli_validation() {
        assert!(rejects(&["pocsag", "--baud", "600", "1:HALLO"]));
        assert!(rejects(&["pocsag", "1:9:HALLO"]));
        assert!(rejects(&["afsk1200", "DL1ABCDEF-15", "APRS"]));
        assert!(rejects(&["morse", "CQ", "--wpm", "0"]));
        assert!(rejects(&["morse", "CQ", "--wpm", "61"]));
        assert!(rejects(&["dtmf", "123", "--tone-ms", "0"]));
        assert!(rejects(&["--sample-rate", "0", "fsk9600", "x"]));
        assert!(rejects(&["fsk9600"]));
    }

    #[test]
    fn test_cli_defaults() {
        assert_eq!(
            command(&["pocsag", "1234567:HALLO"]),
            Commands::Pocsag {
                baud: 512,
                page: parse_page("1234567:HALLO").unwrap(),
            }
        );
        assert_eq!(
            command(&["afsk1200", "DL1ABC-1", "APRS"]),
            Commands::Afsk1200 {
                tx_call: "DL1ABC-1".to_string(),
                dest_call: "APRS".to_string(),
                message: None,
            }
        );

        let cli = Cli::try_parse_from(["rawsignal-tx", "morse", "CQ", "-o", "cq.wav", "--no-tail"])
            .unwrap();
        assert!(cli.no_tail);
        assert_eq!(cli.output, Some(PathBuf::from("cq.wav")));
        assert_eq!(cli.sample_rate, None);
    }

    #[test]
    fn test_encode_pocsag_length() {
        let config = ToolConfig::default();
        let cmd = command(&["pocsag", "--baud", "1200", "1234567:3:HALLO"]);
        let pcm = encode(&cmd, &config, 22050).unwrap();
        let address = PocsagAddress::try_from(1234567).unwrap();
        assert_eq!(pcm.len(), pcm_length(22050, 1200, message_length(address, 5)));
    }

    #[test]
    fn test_encode_every_mode() {
        let config = ToolConfig::default();
        let commands = [
            command(&["afsk1200", "DL1ABC-1", "APRS", "Hello"]),
            command(&["fsk9600", "Hallo"]),
            command(&["ufsk1200", "Hallo"]),
            command(&["morse", "CQ DX"]),
            command(&["dtmf", "123#"]),
        ];
        for cmd in &commands {
            let pcm = encode(cmd, &config, config.sample_rate).unwrap();
            assert!(!pcm.is_empty(), "{:?}", cmd);
            assert_eq!(pcm.sample_rate(), 22050);
        }

        // 2 samples per bit at 22050 Hz
        let pcm = encode(&command(&["fsk9600", "Hallo"]), &config, 22050).unwrap();
        assert_eq!(pcm.len(), 5 * 8 * 2);
    }

    #[test]
    fn test_encode_uses_config_defaults() {
        let mut config = ToolConfig::default();
        config.dtmf.tone_ms = 100;
        let pcm = encode(&command(&["dtmf", "1"]), &config, 8000).unwrap();
        assert_eq!(pcm.len(), 800 + 400);

        let pcm = encode(&command(&["dtmf", "1", "--tone-ms", "10"]), &config, 8000).unwrap();
        assert_eq!(pcm.len(), 80 + 400);
    }

    #[test]
    fn test_encode_errors() {
        let config = ToolConfig::default();
        assert!(encode(&command(&["morse", "###"]), &config, 22050).is_err());
        assert!(encode(&command(&["afsk1200", "DL1ABC-99", "APRS"]), &config, 22050).is_err());
        assert!(encode(&Commands::Info, &config, 22050).is_err());
    }

    #[test]
    fn test_run_writes_wav_without_tail() {
        let temp_file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let cli =
            Cli::try_parse_from(["rawsignal-tx", "-o", path, "--no-tail", "ufsk1200", "abc"]).unwrap();
        run(&cli, ToolConfig::default()).unwrap();

        let reader = hound::WavReader::open(temp_file.path()).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.len() as usize, (20 + 24) * 18);
    }

    #[test]
    fn test_run_appends_tail() {
        let temp_file = tempfile::Builder::new().suffix(".raw").tempfile().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "rawsignal-tx",
            "--sample-rate",
            "8000",
            "-o",
            path,
            "dtmf",
            "5",
        ])
        .unwrap();
        run(&cli, ToolConfig::default()).unwrap();

        let samples = std::fs::read(temp_file.path()).unwrap().len() / 2;
        let body = 2 * 400;
        assert!(samples >= body + 8000 && samples < body + 80000, "{} samples", samples);
    }

    #[quickcheck]
    fn prop_page_address_round_trips(address: u32, message: String) -> bool {
        let address = address & PocsagAddress::MAX;
        let text = format!("{}:{}", address, message);
        match parse_page(&text) {
            Ok(page) => {
                page.address.value() == address
                    && !page.message.is_empty()
                    && text.ends_with(&page.message)
            }
            Err(_) => message.is_empty() || message.split_once(':').is_some(),
        }
    }
}
