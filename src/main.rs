// Entrypoint for the CLI application.
// - Parses flags, installs logging and resolves the API token.
// - Keeps `main` small: build the client session and hand it to the UI loop.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use alice_cli::{ui, ApiClient, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let token = match cli.supplied_token() {
        Some(token) => token.to_string(),
        None => ui::prompt_token()?,
    };
    if token.is_empty() {
        eprintln!("Error: no API token provided");
        std::process::exit(1);
    }

    let config = cli.client_config(token);
    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "starting session");
    let api = ApiClient::new(&config)?;

    // Blocks until the user picks exit.
    ui::main_menu(&api)?;
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
