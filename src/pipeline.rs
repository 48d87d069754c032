//! Run orchestration for the retail dataset.
//!
//! A run walks the fixed entity list (categories, cities, customers,
//! employees, products, sales, countries) and, for each one, extracts the
//! CSV file, applies that entity's cleaning rules and bulk-replaces the
//! target table. Failures are recorded per table; the run always finishes.
//!
//! ```no_run
//! use retail_etl::pipeline::{LoadTarget, RunOptions, run_pipeline};
//!
//! # async fn example() {
//! let report = run_pipeline(&RunOptions::default(), &LoadTarget::DryRun).await;
//! println!("{}", report.summary());
//! # }
//! ```

pub mod entity;
pub mod executor;
pub mod report;

pub use entity::Entity;
pub use executor::{LoadTarget, RunOptions, run_pipeline};
pub use report::{RunReport, TableOutcome, TableReport};
