use crate::config::types::{BrowserConfig, Config, CrawlerConfig, MatcherConfig, SiteEntry};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_matcher_config(&config.matcher)?;

    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }
    for site in &config.sites {
        validate_site(site)?;
    }

    if let Some(path) = &config.output.hits_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hits_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.sink_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "sink_capacity must be >= 1, got {}",
            config.sink_capacity
        )));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_matcher_config(config: &MatcherConfig) -> Result<(), ConfigError> {
    if config.words.is_empty() {
        return Err(ConfigError::Validation(
            "matcher needs at least one word".to_string(),
        ));
    }

    if config.words.iter().any(|w| w.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "matcher words cannot be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_site(site: &SiteEntry) -> Result<(), ConfigError> {
    validate_http_url("start-url", site.start_url())?;

    if let SiteEntry::Paginated {
        endpoint,
        selector,
        form_field,
        ..
    } = site
    {
        validate_http_url("endpoint", endpoint)?;

        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e))
        })?;

        if form_field.trim().is_empty() {
            return Err(ConfigError::Validation(
                "form_field cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that a configured URL parses and uses http or https
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}
