//! # MSME Insight CLI (`msme`)
//!
//! ## Usage
//!
//! ```bash
//! msme --config ./config/msme.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `msme init` | Create the SQLite database and run schema migrations |
//! | `msme load companies <file>` | Replace stored companies from a JSON array |
//! | `msme load articles <file>` | Append articles from a JSON array, skipping duplicates |
//! | `msme search companies "<query>"` | Rank stored companies |
//! | `msme search news "<query>"` | Rank stored articles |
//! | `msme classify "<query>"` | Show intent routing for a query |
//! | `msme chat "<query>"` | Run the full analysis and print JSON |
//! | `msme serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use msme_insight::{chat, config, ingest, migrate, search, server};

/// MSME Insight: company and news relevance ranking with intent-routed analysis.
#[derive(Parser)]
#[command(name = "msme", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/msme.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Load records from a JSON array file.
    Load {
        /// Target collection.
        #[arg(value_enum)]
        collection: ingest::Collection,

        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Rank stored companies or articles against a query.
    Search {
        #[arg(value_enum)]
        kind: search::SearchKind,

        /// The search query string.
        query: String,

        /// Maximum number of results (clamped to `retrieval.max_limit`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print the per-signal score breakdown.
        #[arg(long)]
        explain: bool,
    },

    /// Show which intents and workflows a query routes to.
    Classify { query: String },

    /// Answer a query with the full intent-routed analysis.
    Chat { query: String },

    /// Start the HTTP API server on `[server].bind`.
    Serve,
}

fn init_tracing(level: &str) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Classification needs no config or database.
    if let Commands::Classify { query } = &cli.command {
        return search::run_classify(query);
    }

    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging.level);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Load { collection, file } => {
            ingest::run_load(&cfg, collection, &file).await?;
        }
        Commands::Search {
            kind,
            query,
            limit,
            explain,
        } => {
            search::run_search(&cfg, kind, &query, limit, explain).await?;
        }
        Commands::Classify { .. } => {
            // Handled above (before config loading)
        }
        Commands::Chat { query } => {
            chat::run_chat_command(&cfg, &query).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
