mod audit;
mod cmd;
mod config;
mod service;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[clap(author, version, about = "monitors MEV-Boost relays for consensus-invalid and preference-ignoring bids")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Run(cmd::run::Command),
    Config(cmd::config::Command),
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_task_until_signal(task: impl std::future::Future<Output = eyre::Result<()>>) -> eyre::Result<()> {
    tokio::select! {
        result = task => result,
        _ = signal::ctrl_c() => {
            tracing::info!("shutting down...");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(cmd) => run_task_until_signal(cmd.execute()).await,
        Commands::Config(cmd) => cmd.execute().await,
    }
}
