//! # retail_etl - CSV to PostgreSQL loader for the retail dataset
//!
//! Reads the seven CSV files of the retail sales dataset, cleans them with a
//! small set of per-table rules, and replaces the matching PostgreSQL tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use retail_etl::pipeline::{LoadTarget, RunOptions, run_pipeline};
//!
//! # async fn example() {
//! // Extract and transform everything under ./CSV without touching a database
//! let report = run_pipeline(&RunOptions::default(), &LoadTarget::DryRun).await;
//! for table in &report.tables {
//!     println!("{}: {:?}", table.table, table.outcome);
//! }
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`extract`]: encoding detection and CSV parsing into Polars frames
//! - [`transform`]: per-entity cleaning rules
//! - [`load`]: bulk replace into PostgreSQL with `COPY`
//! - [`pipeline`]: the fixed per-table run and its report
//! - [`config`]: connection settings from the environment file
//! - [`error`]: error types and handling utilities
//! - [`logging`]: console and rolling-file logging

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod transform;
