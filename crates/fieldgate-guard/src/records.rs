//! Record Sinks - append-only CSV trails
//!
//! Four independent tabular logs. Each writes its header row exactly once
//! — only when the destination file does not yet exist — and appends rows
//! thereafter. Sinks never read their own prior contents. A write failure
//! is fatal to the run: audit integrity cannot be guaranteed if a record
//! is silently lost.

use crate::evaluate::{Evaluation, Violation};
use crate::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Cloud-upload trail: digested shared values
pub const CLOUD_STORAGE_FILE: &str = "cloud_storage.csv";
/// Audit trail: what was shared, when, under which flags
pub const UPLOAD_LOG_FILE: &str = "upload_log.csv";
/// Trust-score trail: per-cycle deltas and running scores
pub const TRUST_SCORE_FILE: &str = "trust_score_log.csv";
/// Violation trail: rule preconditions that failed
pub const VIOLATION_LOG_FILE: &str = "policy_violation_log.csv";

/// All four sink file names, in reporting order
pub const SINK_FILES: [&str; 4] = [
    CLOUD_STORAGE_FILE,
    UPLOAD_LOG_FILE,
    TRUST_SCORE_FILE,
    VIOLATION_LOG_FILE,
];

/// One append-only CSV destination
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create a sink for a destination path (nothing is written yet)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first iff the file is new
    ///
    /// # Errors
    /// Propagates any I/O or CSV serialization failure.
    pub fn append(&self, header: &[String], row: &[String]) -> Result<()> {
        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if write_header {
            writer.write_record(header)?;
        }
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }
}

/// The four record sinks, rooted in one output directory
#[derive(Debug, Clone)]
pub struct RecordSinks {
    cloud: CsvSink,
    audit: CsvSink,
    trust: CsvSink,
    violation: CsvSink,
}

impl RecordSinks {
    /// Create the sinks under an output directory
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        let dir = out_dir.as_ref();
        Self {
            cloud: CsvSink::new(dir.join(CLOUD_STORAGE_FILE)),
            audit: CsvSink::new(dir.join(UPLOAD_LOG_FILE)),
            trust: CsvSink::new(dir.join(TRUST_SCORE_FILE)),
            violation: CsvSink::new(dir.join(VIOLATION_LOG_FILE)),
        }
    }

    /// Record one cloud upload: timestamp, device, one column per shared field
    pub fn record_cloud_upload(&self, device_id: &str, shared: &[(String, String)]) -> Result<()> {
        let mut header = vec!["timestamp".to_string(), "device_id".to_string()];
        let mut row = vec![Utc::now().to_rfc3339(), device_id.to_string()];
        for (field, digest) in shared {
            header.push(field.clone());
            row.push(digest.clone());
        }
        self.cloud.append(&header, &row)
    }

    /// Record one audit entry for a cycle's sharing activity
    pub fn record_audit(
        &self,
        device_id: &str,
        evaluation: &Evaluation,
        alert_override: bool,
        cycle_id: u32,
    ) -> Result<()> {
        let header: Vec<String> = [
            "timestamp",
            "device_id",
            "fields_shared",
            "count",
            "tags",
            "alert_override",
            "cycle_id",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let tags: Vec<&str> = evaluation.tag_set().iter().map(|t| t.as_str()).collect();
        let row = vec![
            Utc::now().to_rfc3339(),
            device_id.to_string(),
            evaluation.shared_fields().join(", "),
            evaluation.shared.len().to_string(),
            tags.join(", "),
            alert_override.to_string(),
            cycle_id.to_string(),
        ];
        self.audit.append(&header, &row)
    }

    /// Record one trust-score delta with the resulting running score
    pub fn record_trust(&self, device_id: &str, delta: u64, current: u64) -> Result<()> {
        let header: Vec<String> = ["timestamp", "device_id", "score_delta", "current_score"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = vec![
            Utc::now().to_rfc3339(),
            device_id.to_string(),
            delta.to_string(),
            current.to_string(),
        ];
        self.trust.append(&header, &row)
    }

    /// Record one row per violation
    pub fn record_violations(&self, device_id: &str, violations: &[Violation]) -> Result<()> {
        let header: Vec<String> = [
            "timestamp",
            "device_id",
            "field",
            "value",
            "policy_rule",
            "violation_type",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for violation in violations {
            let row = vec![
                Utc::now().to_rfc3339(),
                device_id.to_string(),
                violation.field.clone(),
                violation.value.clone(),
                violation.rule.clone(),
                "PolicyMismatch".to_string(),
            ];
            self.violation.append(&header, &row)?;
        }
        Ok(())
    }
}
