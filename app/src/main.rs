//! zipdb - postal-code lookups from the command line
//!
//! Every subcommand prints a JSON `CommandResult` envelope on stdout;
//! logs go to stderr.

mod commands;
mod state;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::CommandResult;
use state::AppState;
use zipdb_core::Config;

#[derive(Debug, Parser)]
#[command(name = "zipdb", version, about = "Postal-code lookups over a local record store")]
struct Cli {
    /// JSON config file (defaults and ZIPDB_* variables apply otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Bulk record source: URL or path to a JSON array of records, or
    /// "bundled" for the built-in sample dataset
    #[arg(long, global = true)]
    source: Option<String>,

    /// Base URL that a relative --source is resolved against
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the bulk source if the store has not been populated yet
    Init,
    /// Re-fetch the bulk source and upsert every record
    Reload,
    /// City and state for a zip code
    City { code: String },
    /// All zip codes for a city name (exact match: case and whitespace count)
    Zipcodes { city: String },
    /// Every record, in code order
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// One record picked at random
    Random,
    /// Record count, source and load time
    Stats,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::from_env(),
        };

        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    zipdb_core::init_logging();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let state = AppState::new(config)
        .await
        .context("opening the record store")?;

    let success = match cli.command {
        Command::Init => emit(commands::records::initialize(&state).await)?,
        Command::Reload => emit(commands::records::reload(&state).await)?,
        Command::City { code } => emit(commands::lookup::lookup_city(&state, code).await)?,
        Command::Zipcodes { city } => {
            emit(commands::lookup::lookup_zipcodes(&state, city).await)?
        }
        Command::List { limit } => emit(commands::records::list_records(&state, limit).await)?,
        Command::Random => emit(commands::records::random_record(&state).await)?,
        Command::Stats => emit(commands::records::stats(&state).await)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn emit<T: Serialize>(result: CommandResult<T>) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.success)
}
