use serde::Deserialize;

/// Main configuration structure for postcap
///
/// Every section is optional; a missing section or field falls back to the
/// built-in defaults, so the tool runs without a config file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Post source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the post host whose metadata endpoint is queried
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// Metadata-endpoint fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of retries after the first attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, in seconds (doubles per retry)
    #[serde(rename = "initial-delay-secs", default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    /// Overall request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Rate-limit detection configuration
///
/// The signature is a heuristic token list matched case-insensitively
/// against error text to decide whether an otherwise-unclassified failure
/// is worth retrying. It is data, not logic: operators can extend it when
/// the platform's block pages change wording.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_signature")]
    pub signature: Vec<String>,
}

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Pacing delay between sequential items, in seconds
    #[serde(rename = "delay-secs", default = "default_batch_delay_secs")]
    pub delay_secs: u64,

    /// Worker pool size for the concurrent browser path
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,
}

/// Headless-browser extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Maximum time to wait for page navigation, in seconds
    #[serde(rename = "navigation-timeout-secs", default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Maximum time to wait for caption-bearing markup after navigation
    #[serde(rename = "content-wait-secs", default = "default_content_wait_secs")]
    pub content_wait_secs: u64,

    /// Lower bound of the random pre-navigation jitter, in milliseconds
    #[serde(rename = "jitter-min-ms", default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,

    /// Upper bound of the random pre-navigation jitter, in milliseconds
    #[serde(rename = "jitter-max-ms", default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// User agents rotated across browser sessions
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Sentinel caption used when a page yields no recoverable text
    #[serde(rename = "placeholder-caption", default = "default_placeholder_caption")]
    pub placeholder_caption: String,

    /// Minimum length for a caption candidate to be accepted
    #[serde(rename = "min-caption-length", default = "default_min_caption_length")]
    pub min_caption_length: usize,
}

/// Output artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where result files and failure lists are written
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address for the API server
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,
}

fn default_base_url() -> String {
    "https://www.instagram.com".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_signature() -> Vec<String> {
    [
        "403",
        "forbidden",
        "rate limit",
        "too many requests",
        "graphql/query",
        "temporarily blocked",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_batch_delay_secs() -> u64 {
    3
}

fn default_max_workers() -> usize {
    3
}

fn default_navigation_timeout_secs() -> u64 {
    15
}

fn default_content_wait_secs() -> u64 {
    10
}

fn default_jitter_min_ms() -> u64 {
    1000
}

fn default_jitter_max_ms() -> u64 {
    3000
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_placeholder_caption() -> String {
    "[video content]".to_string()
}

fn default_min_caption_length() -> usize {
    5
}

fn default_output_directory() -> String {
    "./outputs".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_secs: default_initial_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            signature: default_signature(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_batch_delay_secs(),
            max_workers: default_max_workers(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout_secs(),
            content_wait_secs: default_content_wait_secs(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            user_agents: default_user_agents(),
            placeholder_caption: default_placeholder_caption(),
            min_caption_length: default_min_caption_length(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}
