use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Reads a TOML configuration file, then runs it through validation
///
/// # Arguments
///
/// * `path` - Location of the TOML file to load
///
/// # Returns
///
/// * `Ok(Config)` - The parsed configuration, with every field in range
/// * `Err(ConfigError)` - The file was unreadable, unparseable, or invalid
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use postcap::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max retries: {}", config.fetch.max_retries);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration file if it exists, otherwise returns the defaults
///
/// The built-in defaults are validated too, so a future default change that
/// violates the validation rules fails loudly rather than silently.
///
/// # Arguments
///
/// * `path` - Location of the TOML file, which may be absent
///
/// # Returns
///
/// * `Ok(Config)` - The loaded file, or the defaults when no file was found
/// * `Err(ConfigError)` - The file exists but could not be loaded or validated
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        let config = Config::default();
        validate(&config)?;
        Ok(config)
    }
}
