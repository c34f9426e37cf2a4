use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod config;
mod db;
mod loader;

use args::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Compile(args) => commands::compile::run(args).await,
        Command::Validate(args) => commands::validate::run(args).await,
        Command::Diff(args) => commands::diff::run(args).await,
        Command::Graph(args) => commands::graph::run(args).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
