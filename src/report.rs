// report.rs - Scan Report
// Purpose: Render a finished ScanAggregate as the JSON summary handed to callers,
//          plus a text summary and file export for the CLI

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{EffectiveParameters, ScanConfig};
use crate::probe::ProbeOutcome;
use crate::scanner::ScanAggregate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub success: bool,
    pub scanned_count: usize,
    pub found_count: usize,
    pub success_rate: f64,
    pub found_urls: Vec<ProbeOutcome>,
    pub parameters: EffectiveParameters,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
}

impl ScanReport {
    pub fn new(aggregate: ScanAggregate, config: &ScanConfig) -> Self {
        let scanned_count = aggregate.completed();
        let found_count = aggregate.found_count();
        let success_rate = aggregate.success_rate();
        let started_at = aggregate.started_at();
        let finished_at = aggregate.finished_at();
        let duration_seconds = aggregate.duration_seconds();

        Self {
            success: true,
            scanned_count,
            found_count,
            success_rate,
            found_urls: aggregate.into_outcomes(),
            parameters: config.parameters(),
            started_at,
            finished_at,
            duration_seconds,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scan report")
    }

    /// Save report as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).context(format!("Failed to write report to {:?}", path))?;
        Ok(())
    }

    /// Text summary of the scan
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Scanned: {}\nFound: {}\nSuccess rate: {:.2}%\nDuration: {:.2}s\n",
            self.scanned_count, self.found_count, self.success_rate, self.duration_seconds
        );

        for outcome in &self.found_urls {
            match outcome {
                ProbeOutcome::Found {
                    url,
                    files,
                    total_size,
                    ..
                } => {
                    summary.push_str(&format!(
                        "\n[FOUND] {} - {} files, {} bytes\n",
                        url,
                        files.len(),
                        total_size
                    ));
                    for file in files {
                        summary.push_str(&format!(
                            "   - {} ({} bytes, {})\n",
                            file.name, file.size, file.mime_type
                        ));
                    }
                }
                ProbeOutcome::ValidPageUnparsed { url, message } => {
                    summary.push_str(&format!("\n[VALID_PAGE] {} - {}\n", url, message));
                }
                ProbeOutcome::NotFound { .. } => {}
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanParams;

    #[test]
    fn test_empty_report_shape() {
        let config = ScanConfig::from_params(&ScanParams {
            count: Some(5),
            threads: Some(5),
            delay: Some(0.01),
            ..Default::default()
        })
        .unwrap();
        let report = ScanReport::new(ScanAggregate::new(), &config);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["scanned_count"], 0);
        assert_eq!(json["found_count"], 0);
        assert_eq!(json["success_rate"], 0.0);
        assert_eq!(json["found_urls"], serde_json::json!([]));
        assert_eq!(json["parameters"]["count"], 5);
        assert_eq!(json["parameters"]["threads"], 5);
        assert_eq!(json["parameters"]["delay"], 0.01);
        assert_eq!(json["parameters"]["patterns"], false);
        assert_eq!(json["parameters"]["webhook"], false);
    }

    #[test]
    fn test_save_and_summary() {
        let config = ScanConfig::default();
        let report = ScanReport::new(ScanAggregate::new(), &config);
        assert!(report.summary().starts_with("Scanned: 0\nFound: 0\n"));

        let path = std::env::temp_dir().join(format!("gofscan_report_{}.json", std::process::id()));
        report.save_to_file(&path).unwrap();
        let saved: ScanReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(saved.parameters, report.parameters);
    }
}
