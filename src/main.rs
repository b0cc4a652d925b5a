//! # Zine Curator CLI (`zines`)
//!
//! ## Usage
//!
//! ```bash
//! zines --config ./config/zines.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `zines analyze` | Classify and resolve duplicates, print the plan |
//! | `zines apply` | Run the plan: backup, rewrite the store, write an audit log |
//! | `zines remove` | Remove records matching ids or patterns |
//! | `zines stats` | Summarize the record store |
//! | `zines explain <id>` | Show the deciding rule and identity keys of a record |
//!
//! ## Examples
//!
//! ```bash
//! # Machine-readable analysis
//! zines analyze --json
//!
//! # Non-interactive cleanup against another store file
//! zines apply --yes --store ./data/punk_zines_database.json
//!
//! # Preview a removal list
//! zines remove --file removals.txt --dry-run
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zine_curator::cleanup;
use zine_curator::config;
use zine_curator::confirm::{stdin_prompt, AssumeYes, Confirm};
use zine_curator::explain;
use zine_curator::removal;
use zine_curator::stats;

const DEFAULT_CONFIG: &str = "./config/zines.toml";

/// Zine Curator CLI: classification and duplicate cleanup for a punk-zine
/// record store.
///
/// Without a config file at the default location, the store is
/// `punk_zines_database.json` in the working directory.
#[derive(Parser)]
#[command(
    name = "zines",
    about = "Zine Curator: classify and de-duplicate a punk-zine record store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Record store path; overrides `[store].path`.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report what a cleanup would remove. Never writes.
    Analyze {
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove non-zines and duplicates from the store.
    ///
    /// Writes a backup first, then the store, then an audit log of every
    /// removed record.
    Apply {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Remove specific records.
    Remove {
        /// Comma-separated record ids.
        #[arg(long)]
        ids: Option<String>,

        /// Rules file: one `id=`, `url~` or `name~` rule per line.
        #[arg(long)]
        file: Option<PathBuf>,

        /// List matches without writing anything.
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show store statistics.
    Stats,

    /// Explain how one record is classified and keyed.
    Explain {
        /// Record id.
        id: String,
    },
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(stdin_prompt())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zine_curator=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let is_default = cli.config.as_path() == Path::new(DEFAULT_CONFIG);
    let mut cfg = config::load_or_default(&cli.config, is_default)?;
    if let Some(store) = cli.store {
        cfg.store.path = store;
    }

    match cli.command {
        Commands::Analyze { json } => {
            cleanup::run_analyze(&cfg, json)?;
        }
        Commands::Apply { yes } => {
            cleanup::run_apply(&cfg, confirmer(yes).as_mut())?;
        }
        Commands::Remove {
            ids,
            file,
            dry_run,
            yes,
        } => {
            let rules = removal::collect_rules(ids.as_deref(), file.as_deref())?;
            removal::run_remove(&cfg, &rules, dry_run, confirmer(yes).as_mut())?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg)?;
        }
        Commands::Explain { id } => {
            explain::run_explain(&cfg, &id)?;
        }
    }

    Ok(())
}
