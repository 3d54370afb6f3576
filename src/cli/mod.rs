use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod info;
mod validate;

pub use convert::ConvertArgs;

/// midas2eva - MIDAS to EVA converter for MPET time-of-flight data
#[derive(Parser)]
#[command(name = "midas2eva")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a MIDAS run file to EVA
    Convert(ConvertArgs),

    /// Show run parameters of a .mid file or a summary of an EVA file
    Info {
        /// Run file (.mid) or EVA file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check an EVA file for structural problems
    Validate {
        /// EVA file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// `RUST_LOG` takes precedence over the `-v` count
pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert(args) => convert::run(args),
        Commands::Info { file, json } => info::run(file, json),
        Commands::Validate { file } => validate::run(file),
    }
}
