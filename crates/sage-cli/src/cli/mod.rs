//! CLI definitions and interactive screens for the `sage` binary.

pub mod api_key;
pub mod capture;
pub mod chat;
pub mod credentials;
pub mod options;

use std::path::PathBuf;

use clap::Parser;

/// A wise advisor for your system, in the terminal.
#[derive(Parser)]
#[command(name = "sage", version, about, long_about = None)]
pub struct Cli {
    /// Directory for the conversation, options, and stored key.
    #[arg(long, env = "SAGE_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Suppress all log output except errors.
    #[arg(long)]
    pub quiet: bool,

    /// Detailed logs (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Skip the opening greeting.
    #[arg(long)]
    pub no_greeting: bool,
}
