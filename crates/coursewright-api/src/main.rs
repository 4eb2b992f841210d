//! coursewright CLI entry point.
//!
//! Binary name: `cwright`
//!
//! Parses CLI arguments, loads configuration, sets up tracing, then
//! dispatches to the chat loop or a one-shot export command.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use coursewright_infra::config::{load_client_config, load_client_config_file, resolve_data_dir};
use coursewright_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or a session
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "cwright", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => load_client_config_file(path).await?,
        None => {
            let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
            load_client_config(&data_dir).await
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let state = AppState::init(config, !cli.offline);

    let result = match cli.command {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await,
        Commands::Export { format } => cli::export::export_once(&state, format, cli.json).await,
        Commands::Summary => cli::export::summary_once(&state, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
