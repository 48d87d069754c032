//! Pipeline execution engine.
//!
//! Runs extract, transform and load for each selected entity in turn. A
//! failure at any stage is logged and recorded in the report, and the run
//! moves on to the next table.

use super::entity::Entity;
use super::report::{RunReport, TableOutcome, TableReport};
use crate::config::DbConfig;
use crate::extract::{DEFAULT_CSV_DIR, extract_table};
use crate::load::load_table;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where cleaned tables go.
#[derive(Debug, Clone)]
pub enum LoadTarget {
    Database(DbConfig),

    /// Loading was requested but no usable configuration exists; every load
    /// fails with this reason.
    Unavailable(String),

    /// Extract and transform only.
    DryRun,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub csv_dir: PathBuf,

    /// Entities to process. Empty means all of them.
    pub entities: Vec<Entity>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
            entities: Vec::new(),
        }
    }
}

impl RunOptions {
    /// Selected entities in processing order.
    pub fn selected(&self) -> Vec<Entity> {
        Entity::ALL
            .into_iter()
            .filter(|e| self.entities.is_empty() || self.entities.contains(e))
            .collect()
    }
}

/// Execute the pipeline over every selected entity.
pub async fn run_pipeline(options: &RunOptions, target: &LoadTarget) -> RunReport {
    let started_at = Utc::now();
    let start = Instant::now();
    let mut tables = Vec::new();

    for entity in options.selected() {
        let table_start = Instant::now();
        let outcome = process_entity(entity, &options.csv_dir, target).await;
        tables.push(TableReport {
            entity,
            table: entity.table_name(),
            outcome,
            duration_ms: elapsed_ms(table_start),
        });
    }

    RunReport {
        started_at,
        dry_run: matches!(target, LoadTarget::DryRun),
        tables,
        duration_ms: elapsed_ms(start),
    }
}

async fn process_entity(entity: Entity, csv_dir: &Path, target: &LoadTarget) -> TableOutcome {
    let raw = match extract_table(csv_dir, entity.file_name()) {
        Ok(df) => df,
        Err(e) => {
            tracing::error!("extracting data error for {}: {e}", entity.file_name());
            return TableOutcome::ExtractFailed {
                reason: e.to_string(),
            };
        }
    };
    tracing::debug!("Extracted {} rows from {}", raw.height(), entity.file_name());

    let cleaned = match entity.transform(raw) {
        Ok(df) => df,
        Err(e) => {
            tracing::error!("transform error for {entity}: {e}");
            return TableOutcome::TransformFailed {
                reason: e.to_string(),
            };
        }
    };

    match target {
        LoadTarget::DryRun => {
            let rows = cleaned.height();
            tracing::info!("Rows transformed for {entity} is {rows} (dry run)");
            TableOutcome::Transformed { rows }
        }
        LoadTarget::Unavailable(reason) => {
            tracing::error!("data load error for {entity}: {reason}");
            TableOutcome::LoadFailed {
                reason: reason.clone(),
            }
        }
        LoadTarget::Database(config) => {
            match load_table(config, entity.table_name(), &cleaned).await {
                Ok(rows) => {
                    tracing::info!("Rows imported from {entity} is {rows}");
                    TableOutcome::Loaded { rows }
                }
                Err(e) => {
                    tracing::error!("data load error for {entity}: {e}");
                    TableOutcome::LoadFailed {
                        reason: e.to_string(),
                    }
                }
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_keeps_fixed_order() {
        let options = RunOptions {
            entities: vec![Entity::Sales, Entity::Categories],
            ..Default::default()
        };
        assert_eq!(options.selected(), vec![Entity::Categories, Entity::Sales]);
    }

    #[test]
    fn test_selected_defaults_to_all() {
        assert_eq!(RunOptions::default().selected(), Entity::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_unavailable_target_fails_loads_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("categories.csv"),
            "CategoryID,CategoryName\n1,Confections\n2,Shell fish\n",
        )
        .expect("write csv");

        let options = RunOptions {
            csv_dir: dir.path().to_path_buf(),
            entities: vec![Entity::Categories, Entity::Cities],
        };
        let target = LoadTarget::Unavailable("Configuration error: HOST is not set".to_owned());
        let report = run_pipeline(&options, &target).await;

        assert!(!report.dry_run);
        assert_eq!(
            report.outcome(Entity::Categories),
            Some(&TableOutcome::LoadFailed {
                reason: "Configuration error: HOST is not set".to_owned()
            })
        );
        assert!(matches!(
            report.outcome(Entity::Cities),
            Some(TableOutcome::ExtractFailed { .. })
        ));
    }
}
