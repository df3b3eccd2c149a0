//! Configuration module for postcap
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has built-in defaults, so a missing config file is not an error.
//!
//! # Example
//!
//! ```no_run
//! use postcap::config::load_config_or_default;
//! use std::path::Path;
//!
//! let config = load_config_or_default(Path::new("config.toml")).unwrap();
//! println!("Pacing delay: {}s", config.batch.delay_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, BatchConfig, BrowserConfig, Config, FetchConfig, OutputConfig, RateLimitConfig,
    SourceConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
