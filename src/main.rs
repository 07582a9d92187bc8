use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iroiro::config::Config;
use iroiro::error::{self, Error};

mod commands;

#[derive(Parser)]
#[command(
    name = "iroiro",
    version,
    about = "Bookmark rotation with liveness tracking",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding iroiro.json, status.json and rotation.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select one bookmark and hand it to the publisher
    Post {
        /// Post this bookmark instead of drawing from the rotation
        #[arg(long)]
        id: Option<String>,

        /// Seed the random draw for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Select and persist state but do not publish
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Add a bookmark under the next free id
    Add {
        /// Bookmark title
        #[arg(long)]
        title: String,

        /// Bookmark URL
        #[arg(long)]
        url: String,

        /// Category label
        #[arg(long, default_value = "")]
        category: String,

        /// Description (a literal \n becomes a newline)
        #[arg(long, default_value = "")]
        description: String,

        /// Event kind of the bookmark
        #[arg(long)]
        kind: Option<String>,

        /// Skip the duplicate title/URL check
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Change fields of an existing bookmark
    Edit {
        /// Bookmark id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        kind: Option<String>,
    },

    /// Delete a bookmark
    Delete {
        /// Bookmark id
        id: String,
    },

    /// Show one bookmark with its status
    Show {
        /// Bookmark id
        id: String,
    },

    /// List all bookmarks in id order
    List,

    /// Look up bookmarks by exact title or URL
    Check {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        url: Option<String>,
    },

    /// Report the first duplicated title
    Lint,

    /// Mark bookmarks active again
    Reset {
        #[command(subcommand)]
        target: ResetTarget,
    },
}

#[derive(Subcommand)]
enum ResetTarget {
    /// Reset every status record
    All,
    /// Reset a single bookmark
    Id {
        /// Bookmark id
        key: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.level, &config.logging.format, cli.verbose)?;

    tracing::debug!(data_dir = %config.data.data_dir.display(), "Configuration loaded");

    let result = dispatch(cli.command, config).await;
    if let Err(err) = &result {
        match error::find_in_chain(err) {
            Some(cause) => tracing::error!(
                category = cause.category().as_str(),
                recoverable = cause.is_recoverable(),
                error = %format!("{err:#}"),
                "Command failed"
            ),
            None => tracing::error!(error = %format!("{err:#}"), "Command failed"),
        }
    }
    result
}

async fn dispatch(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Post { id, seed, dry_run } => {
            tracing::info!(id = ?id, seed = ?seed, dry_run = %dry_run, "Starting post command");
            commands::post(config, id, seed, dry_run).await?;
        }

        Commands::Add {
            title,
            url,
            category,
            description,
            kind,
            force,
        } => {
            let params = commands::AddParams {
                title,
                url,
                category,
                description,
                kind,
                force,
            };
            commands::add(&config, params)?;
        }

        Commands::Edit {
            id,
            title,
            url,
            category,
            description,
            kind,
        } => {
            let params = commands::EditParams {
                title,
                url,
                category,
                description,
                kind,
            };
            commands::edit(&config, &id, params)?;
        }

        Commands::Delete { id } => commands::delete(&config, &id)?,
        Commands::Show { id } => commands::show(&config, &id)?,
        Commands::List => commands::list(&config)?,
        Commands::Check { title, url } => {
            commands::check(&config, title.as_deref(), url.as_deref())?;
        }
        Commands::Lint => commands::lint(&config)?,

        Commands::Reset { target } => match target {
            ResetTarget::All => commands::reset_all(&config)?,
            ResetTarget::Id { key } => commands::reset_one(&config, &key)?,
        },
    }

    Ok(())
}

/// File (if given) then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config
        .apply_env()
        .context("Failed to apply environment overrides")?;

    if let Some(dir) = &cli.data_dir {
        config.data.data_dir = dir.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))?;
    Ok(config)
}

fn setup_tracing(level: &str, format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("iroiro=debug,warn")
    } else {
        tracing_subscriber::EnvFilter::new(format!("iroiro={level},warn"))
    };

    // stdout is reserved for the published draft
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
