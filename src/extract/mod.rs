//! Post metadata extraction
//!
//! The pipeline goes URL -> validated identifier -> JSON endpoint fetch ->
//! [`PostRecord`]. Failures are classified so the retry layer can tell a
//! throttled request from a dead post, and the caption text is normalized
//! before it reaches any output path.

mod classify;
mod fetcher;
mod retry;
mod text;
mod types;

pub use classify::{
    should_retry, ExtractError, FailureKind, FetchFailure, RateLimitSignature,
};
pub use fetcher::{build_http_client, MetadataClient, PostExtractor};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use text::{normalize_whitespace, truncate_chars};
pub use types::{ExtractOutcome, FailureRecord, PostRecord, DEFAULT_LABEL};
