use anyhow::{Context as _, Result};
use clap::Parser;
use retail_etl::config::{DEFAULT_DATABASE, DEFAULT_ENV_FILE, DbConfig};
use retail_etl::extract::DEFAULT_CSV_DIR;
use retail_etl::pipeline::{Entity, LoadTarget, RunOptions, run_pipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "retail_etl",
    about = "Load the retail CSV dataset into PostgreSQL, replacing existing tables"
)]
pub struct Cli {
    /// Directory holding the CSV files
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    pub csv_dir: PathBuf,

    /// Environment file with USERNAME, HOST, PASSWORD and PORT
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Target database name
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Only process these tables (repeatable). Defaults to all of them.
    #[arg(long = "table", value_enum)]
    pub tables: Vec<Entity>,

    /// Extract and transform only; nothing is written to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory for rolling log files. Defaults to the platform data directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Log to the console only
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            csv_dir: self.csv_dir.clone(),
            entities: self.tables.clone(),
        }
    }

    pub fn load_target(&self) -> LoadTarget {
        if self.dry_run {
            return LoadTarget::DryRun;
        }

        match DbConfig::from_env_file(&self.env_file, &self.database) {
            Ok(config) => {
                tracing::info!("Loading into {}", config.display_target());
                LoadTarget::Database(config)
            }
            Err(e) => {
                tracing::error!("{e}");
                LoadTarget::Unavailable(e.to_string())
            }
        }
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        if self.no_log_file {
            None
        } else {
            self.log_dir
                .clone()
                .or_else(retail_etl::logging::default_log_dir)
        }
    }
}

/// Runs the pipeline. Per-table failures are logged and reported, never
/// returned; only writing the report can fail here.
pub async fn run(cli: Cli) -> Result<()> {
    let options = cli.run_options();
    let target = cli.load_target();

    let report = run_pipeline(&options, &target).await;
    if report.failed() == 0 {
        tracing::info!("{}", report.summary());
    } else {
        tracing::warn!("{}", report.summary());
    }

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}
