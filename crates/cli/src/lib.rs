pub mod commands;

use std::io;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use bookxchange_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use clap::{Parser, Subcommand};
use tracing::Level;

use commands::browse::BrowseArgs;
use commands::chat::ChatArgs;
use commands::recommend::RecommendArgs;
use commands::suggest_price::SuggestPriceArgs;

#[derive(Debug, Parser)]
#[command(
    name = "bookx",
    about = "BookXchange marketplace heuristics CLI",
    long_about = "Suggest asking prices, find similar books, browse a catalog export and talk to the Bookworm assistant.",
    after_help = "Examples:\n  bookx suggest-price --genre Fiction --condition \"Like New\"\n  bookx recommend --listing 42 --limit 5\n  bookx browse --genre Mystery --sort price-low\n  bookx doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Suggest a min/avg/max asking price for a genre and condition")]
    SuggestPrice(SuggestPriceArgs),
    #[command(about = "List catalog books similar to a reference listing")]
    Recommend(RecommendArgs),
    #[command(about = "Filter and sort the catalog like the browse page")]
    Browse(BrowseArgs),
    #[command(about = "Ask the Bookworm assistant a question")]
    Chat(ChatArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // A broken config is reported by the command itself; logging falls back to defaults.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    if let Err(error) = init_logging(&logging) {
        eprintln!("bookx: {error:#}");
    }

    let result = match cli.command {
        Command::SuggestPrice(args) => commands::suggest_price::run(&args),
        Command::Recommend(args) => commands::recommend::run(&args),
        Command::Browse(args) => commands::browse::run(&args),
        Command::Chat(args) => commands::chat::run(&args),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber; output goes to stderr so stdout stays pure JSON.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = Level::from_str(config.level.trim())
        .with_context(|| format!("invalid log level `{}`", config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(level);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
