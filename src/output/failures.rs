use std::path::{Path, PathBuf};

use super::report::timestamped_filename;
use super::{ensure_directory, write_file, OutputError};
use crate::extract::FailureRecord;

/// Renders one failure as a `label::url  # reason` line
///
/// The shape matters: the batch input parser cuts the trailing comment off,
/// so a failure file can be handed straight back to a later run.
pub fn format_failure_line(failure: &FailureRecord) -> String {
    format!(
        "{}::{}  # {}",
        failure.label, failure.source_url, failure.error_description
    )
}

/// Writes the failed-URL list for a batch, if anything failed
///
/// # Returns
///
/// * `Ok(Some(PathBuf))` - Where the list was written
/// * `Ok(None)` - Nothing failed, no file produced
/// * `Err(OutputError)` - If writing was not possible
pub fn write_failures_file(
    failures: &[FailureRecord],
    directory: &Path,
) -> Result<Option<PathBuf>, OutputError> {
    if failures.is_empty() {
        return Ok(None);
    }

    ensure_directory(directory)?;
    let path = directory.join(timestamped_filename("failed_urls", "txt"));

    let mut content = String::from("# URLs that failed extraction, reusable as batch input\n");
    for failure in failures {
        content.push_str(&format_failure_line(failure));
        content.push('\n');
    }

    write_file(&path, &content)?;
    Ok(Some(path))
}
