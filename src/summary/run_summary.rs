//! Run summary (run_summary.json)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use shift_patcher::PatchReport;

/// Schema version for run_summary.json
pub const RUN_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for run_summary.json
pub const RUN_SUMMARY_SCHEMA_ID: &str = "tree-shift/run_summary@1";

/// Run summary (run_summary.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,

    pub schema_id: String,

    /// Run identifier
    pub run_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// Plugin name of the patch layer
    pub patch_name: String,

    /// Target template form key
    pub target: String,

    /// Layers in the load order, lowest priority first
    pub layers: Vec<String>,

    /// Per-outcome counts
    pub report: PatchReport,

    /// Overrides in the written patch layer
    pub override_count: usize,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,

    pub human_summary: String,
}

impl RunSummary {
    pub fn new(
        run_id: String,
        patch_name: String,
        target: String,
        layers: Vec<String>,
        report: PatchReport,
        override_count: usize,
        duration_ms: u64,
    ) -> Self {
        let human_summary = Self::generate_human_summary(&report, &target);

        Self {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION,
            schema_id: RUN_SUMMARY_SCHEMA_ID.to_string(),
            run_id,
            created_at: Utc::now(),
            patch_name,
            target,
            layers,
            report,
            override_count,
            duration_ms,
            human_summary,
        }
    }

    fn generate_human_summary(report: &PatchReport, target: &str) -> String {
        if report.seen == 0 {
            return "No placements in load order".to_string();
        }
        if report.matched() == 0 {
            return format!(
                "No placements of {} among {} examined",
                target, report.seen
            );
        }

        let mut summary = format!(
            "Patched {}/{} placements of {}",
            report.patched,
            report.matched(),
            target
        );
        if report.no_placement > 0 {
            summary.push_str(&format!(", {} without position", report.no_placement));
        }
        if report.zero_delta > 0 {
            summary.push_str(&format!(", {} dropped on zero delta", report.zero_delta));
        }
        summary
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }

    /// Load from file
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "0A1B2C:Skyrim.esm";

    fn summary(report: PatchReport) -> RunSummary {
        let overrides = report.patched;
        RunSummary::new(
            "run-123".to_string(),
            "TreeShift.esp".to_string(),
            TARGET.to_string(),
            vec!["Skyrim.esm".to_string()],
            report,
            overrides,
            12,
        )
    }

    #[test]
    fn test_empty_load_order() {
        let s = summary(PatchReport::default());
        assert_eq!(s.human_summary, "No placements in load order");
        assert_eq!(s.schema_id, RUN_SUMMARY_SCHEMA_ID);
    }

    #[test]
    fn test_nothing_matched() {
        let s = summary(PatchReport {
            seen: 5,
            template_mismatch: 4,
            unresolved_base: 1,
            ..Default::default()
        });
        assert_eq!(
            s.human_summary,
            "No placements of 0A1B2C:Skyrim.esm among 5 examined"
        );
    }

    #[test]
    fn test_partial_patch() {
        let s = summary(PatchReport {
            seen: 10,
            patched: 3,
            no_placement: 1,
            zero_delta: 2,
            template_mismatch: 4,
            ..Default::default()
        });
        assert_eq!(
            s.human_summary,
            "Patched 3/6 placements of 0A1B2C:Skyrim.esm, 1 without position, 2 dropped on zero delta"
        );
        assert_eq!(s.override_count, 3);
    }

    #[test]
    fn test_file_roundtrip() {
        let s = summary(PatchReport {
            seen: 2,
            patched: 2,
            ..Default::default()
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_summary.json");
        s.write_to_file(&path).unwrap();

        let loaded = RunSummary::from_file(&path).unwrap();
        assert_eq!(loaded.run_id, "run-123");
        assert_eq!(loaded.report, s.report);
        assert_eq!(loaded.layers, vec!["Skyrim.esm".to_string()]);
    }
}
