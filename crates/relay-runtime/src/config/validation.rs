//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogFormat, LogOutput, LoggingConfig, RelayConfig};
use relay_onebot::OneBotConfig;
use relay_retweet::RetweetConfig;

/// Validates the entire configuration.
pub fn validate_config(config: &RelayConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_onebot_config(&config.onebot)?;
    validate_retweet_config(&config.retweet)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.format == LogFormat::Json && !cfg!(feature = "json-log") {
        return Err(ConfigError::validation(
            "JSON log format requires the `json-log` feature",
        ));
    }

    Ok(())
}

fn validate_onebot_config(onebot: &OneBotConfig) -> ConfigResult<()> {
    validate_ws_url(&onebot.url, "onebot.url")?;

    if onebot.api_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "onebot.api_timeout_secs must be greater than 0",
        ));
    }

    if onebot.auto_reconnect && onebot.max_retries == Some(0) {
        return Err(ConfigError::validation(
            "onebot.max_retries must be greater than 0 when auto_reconnect is enabled",
        ));
    }

    Ok(())
}

fn validate_retweet_config(retweet: &RetweetConfig) -> ConfigResult<()> {
    if retweet.name.is_empty() {
        return Err(ConfigError::missing_field("retweet.name"));
    }

    if retweet.module.is_empty() {
        return Err(ConfigError::missing_field("retweet.module"));
    }

    validate_ws_url(&retweet.url, "retweet.url")
}

/// Validates a WebSocket URL.
fn validate_ws_url(url: &str, field: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field(field));
    }

    let valid_schemes = ["ws://", "wss://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}
