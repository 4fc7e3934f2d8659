//! Gallery-Harvest main entry point
//!
//! This is the command-line interface for the Gallery-Harvest archiver.

use anyhow::Context;
use clap::{Parser, Subcommand};
use gallery_harvest::config::{load_config_with_hash, Config};
use gallery_harvest::crawler::{
    cancel_on_ctrl_c, CancellationToken, CommentSource, Crawler, HttpFetcher, ListingKind,
    ScrapeOptions, WalkOutcome,
};
use gallery_harvest::extract::submission_id;
use gallery_harvest::storage::{open_storage, SqliteStorage, Store};
use gallery_harvest::ScrapeError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Gallery-Harvest: an incremental, polite gallery archiver
///
/// Walks a user's gallery, scraps and favorites listings, records every
/// submission link, then fills in metadata and comments. Interrupted runs
/// resume where they stopped.
#[derive(Parser, Debug)]
#[command(name = "gallery-harvest")]
#[command(version)]
#[command(about = "An incremental, polite gallery archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk one listing of a user and record submission links
    Links {
        user: String,
        /// Walk the scraps listing instead of the gallery
        #[arg(long, conflicts_with = "favorites")]
        scraps: bool,
        /// Walk the favorites listing instead of the gallery
        #[arg(long)]
        favorites: bool,
    },
    /// Fetch metadata for every link that has none yet
    Metadata {
        /// Also save comment threads
        #[arg(long)]
        comments: bool,
    },
    /// Re-fetch submissions with missing fields or relative dates
    Repair {
        /// Only repair submissions of this uploader
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        comments: bool,
    },
    /// Fetch the comment thread of one submission url
    Comments { url: String },
    /// Walk a user's listings, then fetch metadata
    Scrape {
        user: String,
        #[arg(long)]
        scraps: bool,
        #[arg(long)]
        favorites: bool,
        #[arg(long)]
        comments: bool,
    },
    /// Show statistics from the database and exit
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            match e.downcast_ref::<ScrapeError>() {
                Some(ScrapeError::FatalInit(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gallery_harvest=info,warn"),
            1 => EnvFilter::new("gallery_harvest=debug,info"),
            2 => EnvFilter::new("gallery_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    // Store failures keep their ScrapeError so main can pick the exit status
    let store = open_storage(Path::new(&config.storage.database_path))?;

    let fetcher = HttpFetcher::new(&config.fetcher).context("failed to build HTTP client")?;
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let mut crawler = Crawler::from_config(&config, fetcher, store, cancel);
    let base_url = config.site.base_url.as_str();

    match cli.command {
        Command::Links {
            user,
            scraps,
            favorites,
        } => {
            let kind = if favorites {
                ListingKind::Favorites
            } else if scraps {
                ListingKind::Scraps
            } else {
                ListingKind::Gallery
            };
            let summary = crawler.walk_listing(base_url, &user, kind).await?;
            println!(
                "{} {}: {} links on {} pages ({:?})",
                user,
                kind.as_str(),
                summary.discovered,
                summary.pages_fetched,
                summary.outcome
            );
            if summary.outcome == WalkOutcome::Aborted {
                anyhow::bail!("listing walk aborted, the site might be down");
            }
        }
        Command::Metadata { comments } => {
            let summary = crawler.fetch_all(None, comments).await?;
            println!(
                "Processed {} of {}: {} saved, {} deleted, {} skipped",
                summary.saved + summary.deleted + summary.skipped,
                summary.total,
                summary.saved,
                summary.deleted,
                summary.skipped
            );
        }
        Command::Repair { user, comments } => {
            let summary = crawler.repair(user.as_deref(), comments).await?;
            println!(
                "Repaired {} of {}: {} deleted, {} skipped",
                summary.saved, summary.total, summary.deleted, summary.skipped
            );
        }
        Command::Comments { url } => {
            let id = submission_id(&url)
                .with_context(|| format!("no submission id in {}", url))?;
            let saved = crawler.fetch_comments(CommentSource::Url(&url), &id).await?;
            let count = crawler.store().get_comments(&id)?.len();
            println!("{}: {} comments stored{}", id, count, if saved { "" } else { " (none saved)" });
        }
        Command::Scrape {
            user,
            scraps,
            favorites,
            comments,
        } => {
            let options = ScrapeOptions {
                scraps,
                favorites,
                comments,
            };
            let summary = crawler.scrape(base_url, &user, options).await?;
            for (kind, walk) in &summary.walks {
                println!(
                    "{} {}: {} links on {} pages ({:?})",
                    user,
                    kind.as_str(),
                    walk.discovered,
                    walk.pages_fetched,
                    walk.outcome
                );
            }
            match summary.metadata {
                Some(m) => println!(
                    "Metadata: {} saved, {} deleted, {} skipped of {}",
                    m.saved, m.deleted, m.skipped, m.total
                ),
                None => anyhow::bail!("scrape stopped before fetching metadata"),
            }
        }
        Command::Stats => handle_stats(&config, crawler.store())?,
    }

    Ok(())
}

/// Shows statistics from the database
fn handle_stats(config: &Config, store: &SqliteStorage) -> anyhow::Result<()> {
    let stats = store.stats()?;

    println!("Database: {}\n", config.storage.database_path);
    println!("  Links:          {}", stats.links);
    println!("  Pending:        {}", stats.pending);
    println!("  Complete:       {}", stats.complete);
    println!("  Needs repair:   {}", stats.needs_repair);
    println!("  Comments:       {}", stats.comments);
    println!("  Favorites:      {}", stats.favorites);

    Ok(())
}
