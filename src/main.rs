//! StrataDB command-line shell.
//!
//! # Usage
//!
//! ```bash
//! stratadb users.db
//! RUST_LOG=stratadb=debug stratadb users.db --max-pages 400
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stratadb::common::config::{SplitPolicy, TableOptions, TABLE_MAX_PAGES};
use stratadb::repl::{self, Outcome, Session};
use stratadb::Table;

/// Single-table B-tree store with an interactive shell.
#[derive(Parser, Debug)]
#[command(name = "stratadb", version, about)]
struct Args {
    /// Database file (created if missing)
    path: PathBuf,

    /// Page capacity of the table
    #[arg(long, value_name = "N", default_value_t = TABLE_MAX_PAGES)]
    max_pages: u32,

    /// Reject inserts into a full leaf instead of splitting
    #[arg(long)]
    no_split: bool,

    /// Skip fsync when closing
    #[arg(long)]
    no_sync: bool,
}

impl Args {
    fn table_options(&self) -> TableOptions {
        let split_policy = if self.no_split {
            SplitPolicy::Disabled
        } else {
            SplitPolicy::Split
        };
        TableOptions::default()
            .with_max_pages(self.max_pages)
            .with_split_policy(split_policy)
            .with_sync_on_close(!self.no_sync)
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging();

    let table = Table::open_with_options(&args.path, args.table_options())
        .with_context(|| format!("failed to open {}", args.path.display()))?;
    let session = Session::new(table);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = repl::run(session, &mut input, &mut out)?;
    info!(?outcome, "session ended");
    Ok(match outcome {
        Outcome::Exit => ExitCode::SUCCESS,
        Outcome::EndOfInput => ExitCode::FAILURE,
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
