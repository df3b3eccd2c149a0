//! Result artifacts
//!
//! Writes single-post files, combined batch reports in text or JSON, and
//! the failed-URL list that later runs can feed straight back in. All
//! artifacts land in the configured output directory with timestamped
//! names so runs never clobber each other.

mod failures;
mod json;
mod report;
mod summary;

pub use failures::{format_failure_line, write_failures_file};
pub use json::{write_combined_json, CombinedReport};
pub use report::{
    format_combined_report, format_post_report, timestamped_filename, write_combined_text,
    write_post_to, write_single_post, SaveFormat,
};
pub use summary::{exit_code_for, print_batch_summary, print_post};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub(crate) fn ensure_directory(directory: &std::path::Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(directory).map_err(|source| OutputError::CreateDir {
        path: directory.display().to_string(),
        source,
    })
}

pub(crate) fn write_file(path: &std::path::Path, content: &str) -> Result<(), OutputError> {
    std::fs::write(path, content).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })
}
