use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::report::timestamped_filename;
use super::{ensure_directory, write_file, OutputError};
use crate::batch::BatchRun;
use crate::extract::PostRecord;

/// Machine-readable envelope for a batch's successful extractions
#[derive(Debug, Serialize, Deserialize)]
pub struct CombinedReport {
    /// When the report was assembled, RFC 3339
    pub processed_at: DateTime<Utc>,

    /// Number of records in `results`
    pub total_count: usize,

    pub results: Vec<PostRecord>,
}

impl CombinedReport {
    pub fn new(results: Vec<PostRecord>) -> Self {
        Self {
            processed_at: Utc::now(),
            total_count: results.len(),
            results,
        }
    }
}

/// Writes the combined JSON report for a batch
pub fn write_combined_json(run: &BatchRun, directory: &Path) -> Result<PathBuf, OutputError> {
    ensure_directory(directory)?;
    let report = CombinedReport::new(run.successes.clone());
    let path = directory.join(timestamped_filename("batch", "json"));
    let mut body = serde_json::to_string_pretty(&report)?;
    body.push('\n');
    write_file(&path, &body)?;
    Ok(path)
}
