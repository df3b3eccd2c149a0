use std::path::Path;

use tracing::warn;

use super::BatchItem;
use crate::extract::DEFAULT_LABEL;
use crate::{PostcapError, Result};

/// Reads a batch file and parses it into work items
///
/// # Arguments
///
/// * `path` - Path to a text file with one URL per line
///
/// # Returns
///
/// * `Ok(Vec<BatchItem>)` - The usable inputs, in file order
/// * `Err(PostcapError)` - If the file cannot be read or holds no usable URLs
pub fn read_batch_file(path: &Path) -> Result<Vec<BatchItem>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PostcapError::Input(format!("Cannot read {}: {}", path.display(), e)))?;

    let items = parse_batch_lines(&content);
    if items.is_empty() {
        return Err(PostcapError::Input(format!(
            "No usable URLs found in {}",
            path.display()
        )));
    }
    Ok(items)
}

/// Parses batch file content into labeled work items
///
/// Each line is either a bare URL or `label::url`. Blank lines and lines
/// starting with `#` are skipped. A trailing ` #` comment on a URL is cut
/// off, which makes failure files written by earlier runs directly
/// reusable as input. Lines whose URL part does not start with `http`
/// are skipped with a warning. Inputs without a label get
/// [`DEFAULT_LABEL`].
pub fn parse_batch_lines(content: &str) -> Vec<BatchItem> {
    let mut items = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (label, url) = match line.split_once("::") {
            Some((label, url)) => (label.trim(), url.trim()),
            None => ("", line),
        };

        let url = match url.find(" #") {
            Some(index) => url[..index].trim(),
            None => url,
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            warn!("Skipping line without a URL: {}", line);
            continue;
        }

        let label = if label.is_empty() { DEFAULT_LABEL } else { label };
        items.push(BatchItem {
            label: label.to_string(),
            url: url.to_string(),
        });
    }

    items
}
