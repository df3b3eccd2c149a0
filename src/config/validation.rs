use crate::config::types::{
    ApiConfig, BatchConfig, BrowserConfig, Config, FetchConfig, OutputConfig, RateLimitConfig,
    SourceConfig,
};
use crate::ConfigError;
use url::Url;

/// Checks every configuration section against its allowed ranges
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_fetch_config(&config.fetch)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_batch_config(&config.batch)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates the post source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url has no host: '{}'",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates fetch/retry configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.initial_delay_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "initial_delay_secs must be >= 1, got {}",
            config.initial_delay_secs
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the rate-limit signature token list
///
/// An empty list is allowed (it disables signature-based retries); empty or
/// whitespace-only tokens are not, since they would match every error text.
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    for token in &config.signature {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "rate-limit signature tokens cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates batch configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 32 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 32, got {}",
            config.max_workers
        )));
    }

    // delay_secs >= 0 is always true for u64, so no check needed

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be >= 1, got {}",
            config.navigation_timeout_secs
        )));
    }

    if config.jitter_min_ms > config.jitter_max_ms {
        return Err(ConfigError::Validation(format!(
            "jitter_min_ms ({}) cannot exceed jitter_max_ms ({})",
            config.jitter_min_ms, config.jitter_max_ms
        )));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agents entries cannot be empty".to_string(),
            ));
        }
    }

    if config.min_caption_length < 1 {
        return Err(ConfigError::Validation(format!(
            "min_caption_length must be >= 1, got {}",
            config.min_caption_length
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    if config.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "bind_address is not a valid socket address: '{}'",
            config.bind_address
        )));
    }

    Ok(())
}
