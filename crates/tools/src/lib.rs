//! rawsignal Tools library
//!
//! Argument parsing, configuration and output handling behind the
//! `rawsignal-tx` binary.

pub mod common;
pub mod config;
pub mod tx;

pub use common::{init_logging, write_output, OutputFormat};
pub use config::{load_config, save_config, TailConfig, ToolConfig};
pub use tx::{Cli, Commands};
