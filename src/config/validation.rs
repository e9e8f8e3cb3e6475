use crate::config::types::{ClientConfig, Config, CrawlerConfig, EndpointConfig, OutputConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Largest page the arXiv API will serve in one response
const MAX_PAGE_SIZE: u32 = 2000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_endpoints(&config.endpoints)?;
    validate_client_config(&config.client)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl loop settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    validate_window(
        "page_delay",
        config.page_delay_min,
        config.page_delay_max,
    )?;
    validate_window(
        "document_delay",
        config.document_delay_min,
        config.document_delay_max,
    )?;

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    validate_budget("max_request_seconds", config.max_request_seconds)?;
    validate_budget("max_total_seconds", config.max_total_seconds)?;

    Ok(())
}

/// Validates a jitter window in seconds
fn validate_window(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} bounds must be finite and non-negative, got [{}, {}]",
            name, min, max
        )));
    }

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min must not exceed {}_max, got [{}, {}]",
            name, name, min, max
        )));
    }

    Ok(())
}

/// Validates an optional duration budget in seconds
fn validate_budget(name: &str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(secs) if !secs.is_finite() || secs <= 0.0 => Err(ConfigError::Validation(format!(
            "{} must be a positive number of seconds, got {}",
            name, secs
        ))),
        Some(secs) if Duration::try_from_secs_f64(secs).is_err() => {
            Err(ConfigError::Validation(format!(
                "{} is too large, got {}",
                name, secs
            )))
        }
        _ => Ok(()),
    }
}

/// Validates both endpoint URLs
fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    validate_http_url("query_url", &config.query_url)?;
    validate_http_url("document_url", &config.document_url)?;
    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates the identity rotation pool
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must list at least one identity".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    if config.registry_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "registry_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
