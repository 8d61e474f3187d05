//! Driftnet: a concurrent page-graph crawler
//!
//! This crate crawls the pages reachable from a seed page with a bounded pool
//! of workers. A single coordinator task owns the frontier and the busy count,
//! applies worker reports one at a time, and detects when the crawl is done.
//! Pages whose contents match the configured words are handed to a sink.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod matcher;
pub mod output;
pub mod site;
pub mod url;

use thiserror::Error;

/// Main error type for Driftnet operations
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status for {url}: {status}")]
    Status { url: String, status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink error: {0}")]
    Sink(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to resolve link '{href}': {message}")]
    Resolve { href: String, message: String },

    #[error("Link scheme {found} does not match page scheme {expected}")]
    SchemeMismatch { found: String, expected: String },
}

// Re-export commonly used types
pub use browser::Browser;
pub use config::Config;
pub use crawler::{crawl_site, Crawl, CrawlOptions, CrawlReport, CrawlStats};
pub use matcher::{spawn_sink, Hit, MatchSink, Matcher, SinkTask, WordMatcher};
pub use site::{LinkSite, Page, PaginatedSite, Site};
