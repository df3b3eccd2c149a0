//! Postcap: caption and metadata extraction for social post links
//!
//! This crate extracts caption text and basic metadata (author, like count,
//! publish date, media count) from post URLs, either through the platform's
//! metadata endpoint with retry/backoff or through a headless-browser
//! fallback for batch workloads where the endpoint is blocked.

pub mod api;
pub mod batch;
pub mod browser;
pub mod config;
pub mod extract;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for postcap operations
#[derive(Debug, Error)]
pub enum PostcapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Input file error: {0}")]
    Input(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while interpreting post URLs
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Host is not a supported post host: {0}")]
    UnsupportedHost(String),

    #[error("URL does not point to a post: {0}")]
    NotAPost(String),

    #[error("Invalid post identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type alias for postcap operations
pub type Result<T> = std::result::Result<T, PostcapError>;

/// Shorthand for results carrying a [`ConfigError`]
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Shorthand for results carrying a [`UrlError`]
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-exports for the common entry points
pub use batch::{BatchItem, BatchRun};
pub use config::Config;
pub use extract::{FailureRecord, PostExtractor, PostRecord};
pub use url::{parse_post_url, ParsedPostUrl};
