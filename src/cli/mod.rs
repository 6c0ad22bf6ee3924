//! CLI parser and command dispatch.

mod serve;
mod span;

use clap::{Parser, Subcommand};

use crate::config::ConfigArgs;

#[derive(Parser)]
#[command(name = "quantnews")]
#[command(about = "Read-only HTTP API over a financial news article database")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:5000)
        #[arg(default_value = "127.0.0.1:5000")]
        bind: String,
    },

    /// Show the newest and oldest article timestamps for a source
    Span {
        /// Source name (unregistered names use the default collection)
        source: String,
        /// Only count articles mentioning this company
        #[arg(short, long)]
        company: Option<String>,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.config.into_settings()?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Span { source, company } => {
            span::cmd_span(&settings, &source, company.as_deref()).await
        }
    }
}
