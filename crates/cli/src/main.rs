//! Qaryz CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP API for the WhatsApp integration
//! - `chat`: Talk to the bot in the terminal
//! - `onboard`: Initialize config & docs directory
//! - `doctor`: Diagnose configuration and corpus

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "qaryz",
    about = "Qaryz — bankruptcy consultation bot for Kazakhstan",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the bot in the terminal
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Initialize configuration and the docs directory
    Onboard,

    /// Diagnose configuration, API key and corpus
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
