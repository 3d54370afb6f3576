//! # midas2eva
//!
//! Command-line front end for converting MIDAS run files to EVA.
//!
//! ## Usage
//!
//! ```bash
//! # Convert, running mdump on the run file
//! midas2eva convert run00042.mid
//!
//! # Convert from a capture saved earlier, with a config file
//! midas2eva convert run00042.mid --capture run00042.txt --config midas2eva.toml
//!
//! # Inspect and check the result
//! midas2eva info run00042_eva.dat
//! midas2eva validate run00042_eva.dat
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
