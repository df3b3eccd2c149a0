use thiserror::Error;

use crate::config::RateLimitConfig;

/// What kind of failure a fetch attempt produced
///
/// The kind decides whether retrying can help. `NotFound`, `Forbidden`, and
/// `InvalidInput` describe conditions no retry will change. `RateLimited` is
/// always worth retrying. `Transport` and `Unclassified` failures are only
/// retried when their message matches the rate-limit signature, since those
/// often turn out to be the platform throttling in disguise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The input itself was unusable (bad URL, wrong host)
    InvalidInput,
    /// The post does not exist or was removed
    NotFound,
    /// The post exists but is not served without credentials
    Forbidden,
    /// The platform explicitly throttled the request
    RateLimited,
    /// The request never completed (timeout, connection refused)
    Transport,
    /// Anything that fits none of the above
    Unclassified,
}

/// One failed fetch attempt, classified
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Forbidden, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimited, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unclassified, message)
    }
}

/// Extraction error after retries have been settled
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// A failure that was terminal on first sight
    #[error("{0}")]
    Fetch(#[from] FetchFailure),

    /// All attempts were used up; carries the last failure seen
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: FetchFailure },
}

impl ExtractError {
    /// The classification of the underlying failure
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::Fetch(failure) => failure.kind,
            ExtractError::Exhausted { last, .. } => last.kind,
        }
    }
}

/// Message fragments that identify a throttling response
///
/// Matching is case-insensitive substring search. The token list comes from
/// configuration, so deployments can extend it when the platform starts
/// phrasing its blocks differently.
#[derive(Debug, Clone)]
pub struct RateLimitSignature {
    tokens: Vec<String>,
}

impl RateLimitSignature {
    pub fn new(tokens: &[String]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(&config.signature)
    }

    /// Whether the message contains any signature token
    pub fn matches(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.tokens.iter().any(|token| lowered.contains(token))
    }
}

impl Default for RateLimitSignature {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

/// Decides whether a failed attempt should be tried again
pub fn should_retry(failure: &FetchFailure, signature: &RateLimitSignature) -> bool {
    match failure.kind {
        FailureKind::InvalidInput | FailureKind::NotFound | FailureKind::Forbidden => false,
        FailureKind::RateLimited => true,
        FailureKind::Transport | FailureKind::Unclassified => signature.matches(&failure.message),
    }
}
