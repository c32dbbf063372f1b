use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{write_export_file, HitReport, Roster};
use crate::models::{Mode, Record};

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to write the CSV export
    pub generate_csv: bool,
    /// Whether to write the JSON hit report
    pub generate_json: bool,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            generate_csv: true,
            generate_json: false,
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug, Default)]
pub struct Stage3Result {
    /// Path to the CSV export (if generated)
    pub csv_path: Option<PathBuf>,
    /// Data rows written to the CSV export
    pub rows_written: usize,
    /// Path to the JSON report (if generated)
    pub json_path: Option<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces up to two views of the hits:
/// 1. CSV export in the per-mode column layout, one row per hit
/// 2. JSON report with every record's hits and run totals
pub fn execute_stage3(
    records: &[Record],
    mode: Mode,
    roster: &Roster,
    csv_output: Option<&Path>,
    json_output: Option<&Path>,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut result = Stage3Result::default();

    if config.generate_csv {
        if let Some(path) = csv_output {
            info!("Writing CSV export to {:?}", path);
            result.rows_written = write_export_file(path, mode, records, roster)?;
            result.csv_path = Some(path.to_path_buf());
        }
    }

    if config.generate_json {
        if let Some(path) = json_output {
            info!("Writing hit report to {:?}", path);
            HitReport::from_records(mode, records).write_json(path)?;
            result.json_path = Some(path.to_path_buf());
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMeta, Source};

    #[test]
    fn test_stage3_config_default() {
        let config = Stage3Config::default();
        assert!(config.generate_csv);
        assert!(!config.generate_json);
    }

    #[test]
    fn test_execute_stage3_writes_requested_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("out.csv");
        let json_path = dir.path().join("out.json");
        let records = vec![Record::new("1", Source::Chat(ChatMeta::default()), "")];
        let config = Stage3Config {
            generate_csv: true,
            generate_json: true,
        };

        let result = execute_stage3(
            &records,
            Mode::AskChat,
            &Roster::default(),
            Some(&csv_path),
            Some(&json_path),
            &config,
        )
        .unwrap();

        assert_eq!(result.rows_written, 1);
        assert_eq!(result.csv_path.as_deref(), Some(csv_path.as_path()));
        assert!(json_path.exists());
    }

    #[test]
    fn test_execute_stage3_skips_missing_paths() {
        let records: Vec<Record> = Vec::new();
        let result = execute_stage3(
            &records,
            Mode::Jira,
            &Roster::default(),
            None,
            None,
            &Stage3Config::default(),
        )
        .unwrap();

        assert!(result.csv_path.is_none());
        assert!(result.json_path.is_none());
    }
}
