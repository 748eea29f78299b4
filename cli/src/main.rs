//! Circulate - library lending at the terminal.
//!
//! A thin shell over circulate-engine: it loads the snapshot file, runs one
//! subcommand, and saves the library on the way out. All rules live in the
//! engine; this binary only prompts, prints, and persists.

mod config;
mod demo;
mod menu;
mod persist;

use crate::config::Config;
use circulate_engine::report;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Circulate - book lending for a small library
#[derive(Parser, Debug)]
#[command(name = "circulate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Snapshot file the library is loaded from and saved to
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (the default)
    Menu,
    /// Scripted walkthrough of the lending rules
    Demo,
    /// Print the library's headline counts
    Summary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circulate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let mut store = persist::load_or_new(&config.data_path)?;
            menu::run(&mut store, &config)?;
            persist::save(&store, &config.data_path)?;
            tracing::info!(path = %config.data_path.display(), "library saved");
        }
        Command::Demo => demo::run()?,
        Command::Summary => {
            let store = persist::load_or_new(&config.data_path)?;
            menu::print_summary(&report::summarize(&store)?);
        }
    }

    Ok(())
}
