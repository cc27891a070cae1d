//! gradscrape CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gradscrape::{
    error::{AppError, Result},
    models::{Config, SortColumn},
    pipeline,
    storage::PostStore,
};

/// gradscrape - Gradcafe Admissions Survey Scraper
#[derive(Parser, Debug)]
#[command(
    name = "gradscrape",
    version,
    about = "Scrapes gradcafe admissions survey listings into SQLite"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape posts for one or more search seeds
    Scrape {
        /// Search seeds, each driving its own workflow
        #[arg(required = true)]
        seeds: Vec<String>,

        /// Survey endpoint URL (overrides configuration)
        #[arg(long)]
        api: Option<String>,

        /// Sort column: institution, program or date
        #[arg(long)]
        sort: Option<String>,

        /// SQLite database file (overrides configuration)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Export stored posts as a JSON snapshot
    Export {
        /// Output file (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show store statistics
    Stats,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Scrape {
            seeds,
            api,
            sort,
            db,
        } => {
            if let Some(api) = api {
                config.survey.endpoint = api;
            }
            if let Some(db) = db {
                config.storage.db_path = db;
            }
            let sort = sort
                .map(|s| s.parse::<SortColumn>())
                .transpose()
                .map_err(AppError::Config)?;

            log::info!("Scraping {} seed(s)...", seeds.len());
            let summary = pipeline::run_scrape(&config, &seeds, sort).await?;

            log::info!(
                "Scrape complete: {} inserted, {} duplicates, {} dropped",
                summary.total_inserted(),
                summary.total_duplicates(),
                summary.total_dropped()
            );
        }

        Command::Export { output } => {
            let output = output.unwrap_or_else(|| config.storage.export_path.clone());
            let count = pipeline::run_export(&config.storage.db_path, &output).await?;
            log::info!("Exported {} posts to {}", count, output.display());
        }

        Command::Stats => {
            let store = PostStore::open(&config.storage.db_path)?;
            let stats = store.stats()?;
            log::info!("Posts stored: {}", stats.total);
            log::info!("Distinct schools: {}", stats.schools);
            match (stats.first_post, stats.last_post) {
                (Some(first), Some(last)) => {
                    log::info!("Post dates: {first} to {last}");
                }
                _ => log::info!("Post dates: none recorded"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("Configuration OK");
        }
    }

    Ok(())
}
