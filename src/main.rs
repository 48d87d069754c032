//! # retail_etl entry point
//!
//! Runs the fixed ETL pass once and exits:
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap, all optional)
//!   ├─> Initialize logging (console + rolling files)
//!   └─> Current-thread Tokio runtime
//!       └─> For each table: extract → transform → load
//! ```
//!
//! Table failures are logged and do not change the exit status.

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    retail_etl::logging::init(cli.log_dir().as_deref())?;

    // sqlx is async; the run itself is strictly sequential.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(cli::run(cli))
}
