use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label assigned to inputs that did not carry one
pub const DEFAULT_LABEL: &str = "unspecified";

/// Everything recovered about a single post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Human-assigned name for this input
    pub label: String,

    /// The post URL the record was built from
    pub source_url: String,

    /// Caption text with whitespace collapsed, empty when the post has none
    pub caption_text: String,

    /// Author account name, "unknown" when it could not be recovered
    pub author_handle: String,

    /// Like count at extraction time
    pub like_count: u64,

    /// Publication instant, when the source exposed one
    pub published_at: Option<DateTime<Utc>>,

    /// Number of media items in the post, at least 1
    pub media_count: u32,

    /// Whether the primary media is a video
    pub is_video: bool,
}

/// A single input that could not be extracted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub label: String,
    pub source_url: String,
    pub error_description: String,
}

/// Terminal result of processing one batch input
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    Success(PostRecord),
    Failure(FailureRecord),
}

impl ExtractOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractOutcome::Success(_))
    }

    /// The label of the input this outcome belongs to
    pub fn label(&self) -> &str {
        match self {
            ExtractOutcome::Success(record) => &record.label,
            ExtractOutcome::Failure(failure) => &failure.label,
        }
    }
}
