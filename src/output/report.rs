use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{ensure_directory, write_file, OutputError};
use crate::batch::BatchRun;
use crate::extract::PostRecord;

/// On-disk format for saved posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Text,
    Json,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Text => "txt",
            SaveFormat::Json => "json",
        }
    }
}

/// Builds a `<prefix>_<YYYYMMDD_HHMMSS>.<extension>` filename
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Utc::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Renders one post as a human-readable text block
pub fn format_post_report(record: &PostRecord) -> String {
    let published = match record.published_at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    };
    let caption = if record.caption_text.is_empty() {
        "(no caption)"
    } else {
        &record.caption_text
    };

    format!(
        "Label: {}\nURL: {}\nAuthor: @{}\nLikes: {}\nPublished: {}\nMedia: {} item(s)\nVideo: {}\n\n{}\n",
        record.label,
        record.source_url,
        record.author_handle,
        record.like_count,
        published,
        record.media_count,
        if record.is_video { "yes" } else { "no" },
        caption
    )
}

/// Saves a single post to the output directory
///
/// The filename embeds the author handle and a timestamp, so repeated
/// extractions of the same post never overwrite each other.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the file was written
/// * `Err(OutputError)` - If the directory or file could not be created
pub fn write_single_post(
    record: &PostRecord,
    directory: &Path,
    format: SaveFormat,
) -> Result<PathBuf, OutputError> {
    ensure_directory(directory)?;

    let prefix = format!("post_{}", sanitize_for_filename(&record.author_handle));
    let path = directory.join(timestamped_filename(&prefix, format.extension()));

    write_file(&path, &render_post(record, format)?)?;
    Ok(path)
}

/// Saves a single post to an explicit path, creating parent directories
pub fn write_post_to(
    record: &PostRecord,
    path: &Path,
    format: SaveFormat,
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    write_file(path, &render_post(record, format)?)
}

fn render_post(record: &PostRecord, format: SaveFormat) -> Result<String, OutputError> {
    match format {
        SaveFormat::Text => Ok(format_post_report(record)),
        SaveFormat::Json => {
            let mut body = serde_json::to_string_pretty(record)?;
            body.push('\n');
            Ok(body)
        }
    }
}

/// Renders a whole batch as one text report
pub fn format_combined_report(run: &BatchRun) -> String {
    let divider = "=".repeat(60);
    let mut out = String::new();

    out.push_str("Caption Batch Report\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Succeeded: {}  Failed: {}\n",
        run.successes.len(),
        run.failures.len()
    ));

    for record in &run.successes {
        out.push_str(&format!("\n{}\n", divider));
        out.push_str(&format_post_report(record));
    }

    if !run.failures.is_empty() {
        out.push_str(&format!("\n{}\nFailed posts:\n", divider));
        for failure in &run.failures {
            out.push_str(&super::format_failure_line(failure));
            out.push('\n');
        }
    }

    out
}

/// Writes the combined text report for a batch
pub fn write_combined_text(run: &BatchRun, directory: &Path) -> Result<PathBuf, OutputError> {
    ensure_directory(directory)?;
    let path = directory.join(timestamped_filename("batch", "txt"));
    write_file(&path, &format_combined_report(run))?;
    Ok(path)
}

fn sanitize_for_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
