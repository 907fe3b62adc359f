//! StyleHub CLI: the `stylehub` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured log filter.
const LOG_ENV: &str = "STYLEHUB_LOG";

fn main() {
    let cli = Cli::parse();
    let settings = config::load_or_exit(cli.config.as_deref(), cli.store.as_deref());
    init_tracing(&settings.log);
    tracing::debug!(store = %settings.store_path.display(), zone = %settings.zone, "settings resolved");

    let ctx = support::Context::new(settings, cli.json);
    match cli.command {
        Commands::Service { command } => commands::service::run(command, &ctx),
        Commands::Stylist { command } => commands::stylist::run(command, &ctx),
        Commands::Client { command } => commands::client::run(command, &ctx),
        Commands::Schedule { command } => commands::schedule::run(command, &ctx),
        Commands::Appointment { command } => commands::appointment::run(command, &ctx),
        Commands::Store { command } => commands::store::run(command, &ctx),
    }
}

fn init_tracing(configured: &str) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => EnvFilter::try_new(&from_env),
        _ => EnvFilter::try_new(configured),
    }
    .unwrap_or_else(|e| {
        eprintln!("error: invalid log filter: {e}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
