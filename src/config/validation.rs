use crate::config::types::{CacheConfig, Config, FetchConfig};
use crate::ConfigError;

/// Upper bound accepted for `max-redirects`
const MAX_REDIRECTS_LIMIT: usize = 20;

/// Upper bound accepted for `ttl-secs` and `check-period-secs` (one year)
const MAX_CACHE_SECS: u64 = 365 * 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_cache_config(&config.cache)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than 0".to_string(),
        ));
    }

    if config.max_redirects > MAX_REDIRECTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be at most {}, got {}",
            MAX_REDIRECTS_LIMIT, config.max_redirects
        )));
    }

    if config.max_body_bytes == 0 {
        return Err(ConfigError::Validation(
            "max-body-bytes must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "ttl-secs must be greater than 0".to_string(),
        ));
    }

    if config.ttl_secs > MAX_CACHE_SECS {
        return Err(ConfigError::Validation(format!(
            "ttl-secs must be at most {}, got {}",
            MAX_CACHE_SECS, config.ttl_secs
        )));
    }

    if config.check_period_secs == 0 {
        return Err(ConfigError::Validation(
            "check-period-secs must be greater than 0".to_string(),
        ));
    }

    if config.check_period_secs > MAX_CACHE_SECS {
        return Err(ConfigError::Validation(format!(
            "check-period-secs must be at most {}, got {}",
            MAX_CACHE_SECS, config.check_period_secs
        )));
    }

    Ok(())
}
