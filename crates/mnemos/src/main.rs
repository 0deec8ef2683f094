// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemos - a personal semantic memory for your files.
//!
//! This is the binary entry point. Every subcommand loads one validated
//! configuration, opens the databases it names, and runs a single stage of
//! the pipeline (or, for `run`, the watcher and worker together).

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod enqueue;
mod pipeline;
mod search;
mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemos_config::MnemosConfig;
use mnemos_core::MnemosError;
use tracing::error;

use crate::pipeline::Pipeline;

/// Mnemos - a personal semantic memory for your files.
#[derive(Parser, Debug)]
#[command(name = "mnemos", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the configured roots and record file changes.
    Watch,
    /// Index queued events into the vector store.
    Index {
        /// Process a single batch and exit.
        #[arg(long)]
        once: bool,
    },
    /// Run the watcher and the indexing worker together.
    Run,
    /// Search indexed files by meaning.
    Search {
        /// Free-text query.
        query: String,
        /// Number of results (defaults to retrieval.top_k).
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Record an event by hand.
    Enqueue {
        /// Event type, e.g. created, modified, deleted.
        event_type: String,
        /// File the event refers to.
        path: String,
    },
    /// Show queue depth, record count, and embedder health.
    Status {
        /// Print status as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> MnemosConfig {
    let result = match path {
        Some(path) => mnemos_config::load_and_validate_path(path),
        None => mnemos_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            mnemos_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemos={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(command: Commands, config: MnemosConfig) -> Result<(), MnemosError> {
    if let Commands::Config = command {
        let rendered = mnemos_config::render_toml(&config)
            .map_err(|e| MnemosError::Config(e.to_string()))?;
        print!("{rendered}");
        return Ok(());
    }

    let pipeline = Pipeline::open(config).await?;
    let result = match command {
        Commands::Watch => {
            let cancel = shutdown::install_signal_handler();
            serve::run_watch(&pipeline, cancel).await
        }
        Commands::Index { once } => {
            let cancel = shutdown::install_signal_handler();
            serve::run_index(&pipeline, once, cancel).await
        }
        Commands::Run => {
            let cancel = shutdown::install_signal_handler();
            serve::run_serve(&pipeline, cancel).await
        }
        Commands::Search { query, top_k, json } => {
            search::run_search(&pipeline, &query, top_k, json).await
        }
        Commands::Enqueue { event_type, path } => {
            enqueue::run_enqueue(&pipeline, &event_type, &path).await
        }
        Commands::Status { json } => status::run_status(&pipeline, json).await,
        Commands::Config => Ok(()),
    };

    if let Err(e) = pipeline.close().await {
        error!(error = %e, "failed to checkpoint database on close");
    }
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    let Some(command) = cli.command else {
        println!("mnemos: use --help for available commands");
        return;
    };

    if let Err(e) = dispatch(command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn parses_search_with_top_k() {
        let cli = Cli::try_parse_from(["mnemos", "search", "tax forms", "-k", "5"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, top_k, json }) => {
                assert_eq!(query, "tax forms");
                assert_eq!(top_k, Some(5));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_index_once_and_global_config() {
        let cli =
            Cli::try_parse_from(["mnemos", "index", "--once", "--config", "/etc/m.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/m.toml")));
        assert!(matches!(cli.command, Some(Commands::Index { once: true })));
    }

    #[test]
    fn parses_enqueue() {
        let cli = Cli::try_parse_from(["mnemos", "enqueue", "created", "/tmp/a.txt"]).unwrap();
        match cli.command {
            Some(Commands::Enqueue { event_type, path }) => {
                assert_eq!(event_type, "created");
                assert_eq!(path, "/tmp/a.txt");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn enqueue_requires_a_path() {
        assert!(Cli::try_parse_from(["mnemos", "enqueue", "created"]).is_err());
    }

    #[test]
    fn default_config_is_valid() {
        let config = mnemos_config::load_and_validate_str("").unwrap();
        assert_eq!(config.retrieval.top_k, 3);
    }
}
