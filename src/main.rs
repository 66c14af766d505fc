//! Imgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod image;

#[derive(Parser)]
#[command(name = "imgraph")]
#[command(about = "Build and lay out weighted graphs of images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Root directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph described in a TOML file and lay it out
    Build {
        /// Graph description file, relative to the root
        #[arg(short, long, default_value = config::DEFAULT_GRAPH_FILE)]
        file: PathBuf,
    },
    /// Add one vertex per image file found under the root
    Scan,
    /// Show the last saved scene
    Status,
    /// Clear the cache
    Clear,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("imgraph={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Imgraph v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Root: {}", cli.root.display());

    match cli.command {
        Commands::Build { file } => commands::build(&cli.root, &file),
        Commands::Scan => commands::scan(&cli.root),
        Commands::Status => commands::status(&cli.root),
        Commands::Clear => commands::clear(&cli.root),
        Commands::Version => {
            println!("Imgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
