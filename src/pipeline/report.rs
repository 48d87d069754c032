use super::entity::Entity;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// What happened to a single table during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Written to the database
    Loaded { rows: usize },

    /// Cleaned but not loaded (dry run)
    Transformed { rows: usize },

    ExtractFailed { reason: String },
    TransformFailed { reason: String },
    LoadFailed { reason: String },
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Transformed { .. })
    }

    pub fn rows(&self) -> Option<usize> {
        match self {
            Self::Loaded { rows } | Self::Transformed { rows } => Some(*rows),
            Self::ExtractFailed { .. } | Self::TransformFailed { .. } | Self::LoadFailed { .. } => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub entity: Entity,
    pub table: &'static str,
    pub outcome: TableOutcome,
    pub duration_ms: u64,
}

/// Report generated after a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub tables: Vec<TableReport>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.tables.iter().filter(|t| t.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.tables.len() - self.succeeded()
    }

    pub fn outcome(&self, entity: Entity) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|t| t.entity == entity)
            .map(|t| &t.outcome)
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        let rows: usize = self.tables.iter().filter_map(|t| t.outcome.rows()).sum();
        format!(
            "Run {}: {} of {} tables {}, {} failed, {rows} rows, {:.2}s",
            if self.failed() == 0 { "completed" } else { "finished with errors" },
            self.succeeded(),
            self.tables.len(),
            if self.dry_run { "transformed" } else { "loaded" },
            self.failed(),
            self.duration_ms as f64 / 1000.0
        )
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            started_at: Utc::now(),
            dry_run: false,
            tables: vec![
                TableReport {
                    entity: Entity::Categories,
                    table: "Categories",
                    outcome: TableOutcome::Loaded { rows: 11 },
                    duration_ms: 3,
                },
                TableReport {
                    entity: Entity::Sales,
                    table: "Sales",
                    outcome: TableOutcome::LoadFailed {
                        reason: "Database error: connection refused".to_owned(),
                    },
                    duration_ms: 40,
                },
            ],
            duration_ms: 1500,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = report();
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.summary(),
            "Run finished with errors: 1 of 2 tables loaded, 1 failed, 11 rows, 1.50s"
        );
    }

    #[test]
    fn test_json_shape() -> Result<()> {
        let value = serde_json::to_value(report())?;
        assert_eq!(value["tables"][0]["entity"], "categories");
        assert_eq!(value["tables"][0]["outcome"]["status"], "loaded");
        assert_eq!(value["tables"][0]["outcome"]["rows"], 11);
        assert_eq!(value["tables"][1]["outcome"]["status"], "load_failed");
        Ok(())
    }

    #[test]
    fn test_write_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.json");
        report().write_json(&path)?;
        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("\"load_failed\""));
        Ok(())
    }
}
