//! rawsignal-tx - encode messages as PCM for digital radio modes

use anyhow::Result;
use clap::Parser;
use rawsignal_tools::tx::run;
use rawsignal_tools::{init_logging, load_config, Cli, ToolConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let config: ToolConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => ToolConfig::default(),
    };
    config.validate()?;

    run(&cli, config)
}
