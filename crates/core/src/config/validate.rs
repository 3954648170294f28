use tracing::debug;

use super::{types::Config, ConfigError, MockFulfillmentMode};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one fulfillment attempt
/// - Lock poll interval fits inside the lock timeout
/// - Fulfillment URL and mock endpoint path are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Lifecycle validation
    if config.lifecycle.fulfillment_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "lifecycle.fulfillment_attempts must be at least 1".to_string(),
        ));
    }

    // Lock validation
    if config.lock.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "lock.poll_interval_ms cannot be 0".to_string(),
        ));
    }
    if config.lock.timeout_ms < config.lock.poll_interval_ms {
        return Err(ConfigError::ValidationError(format!(
            "lock.timeout_ms ({}) must not be below lock.poll_interval_ms ({})",
            config.lock.timeout_ms, config.lock.poll_interval_ms
        )));
    }

    // Fulfillment validation
    if config.fulfillment.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "fulfillment.url cannot be empty".to_string(),
        ));
    }
    if fulfillment_outlasts_lock(config) {
        debug!(
            fulfillment_timeout_secs = config.fulfillment.timeout_secs,
            lock_timeout_ms = config.lock.timeout_ms,
            "Fulfillment request timeout is not shorter than the lock deadline; \
             slow hand-offs end as lock timeouts"
        );
    }

    if config.mock_fulfillment.enabled {
        if !config.mock_fulfillment.path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "mock_fulfillment.path must start with '/', got '{}'",
                config.mock_fulfillment.path
            )));
        }
        if config.mock_fulfillment.mode == (MockFulfillmentMode::FailEvery { n: 0 }) {
            return Err(ConfigError::ValidationError(
                "mock_fulfillment.mode.n must be at least 1".to_string(),
            ));
        }
    }

    Ok(())
}

/// True when the lock deadline cancels a hand-off before the HTTP timeout fires.
fn fulfillment_outlasts_lock(config: &Config) -> bool {
    u64::from(config.fulfillment.timeout_secs) * 1000 >= config.lock.timeout_ms
}
