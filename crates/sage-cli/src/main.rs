//! Sage terminal assistant entry point.
//!
//! Binary name: `sage`
//!
//! Parses CLI arguments, sets up logging, wires the application state, then
//! hands over to the interactive chat loop.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,sage=debug,sage_core=debug,sage_infra=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut state = AppState::init(cli.data_dir.as_deref()).await?;
    cli::credentials::load_api_key(&mut state).await?;

    cli::chat::loop_runner::run_chat_loop(&mut state, !cli.no_greeting).await
}
