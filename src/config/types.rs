use serde::Deserialize;

/// Browser-like user agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/62.0.3202.75 Safari/537.36";

/// Accept-Language header sent with every request unless overridden
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,et;q=0.8";

/// Main configuration structure for Driftnet
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent workers (also the dispatch queue capacity)
    pub workers: u32,

    /// Capacity of the queue between workers and the hit sink
    #[serde(rename = "sink-capacity", default = "default_sink_capacity")]
    pub sink_capacity: u32,
}

fn default_sink_capacity() -> u32 {
    16
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header value
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    DEFAULT_ACCEPT_LANGUAGE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Content matcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    /// Every word must occur in a page for it to match
    pub words: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the markdown file the hits are written to
    #[serde(rename = "hits-path")]
    pub hits_path: Option<String>,
}

/// A site to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SiteEntry {
    /// Follow same-host `<a href>` links from the start page
    Links {
        #[serde(rename = "start-url")]
        start_url: String,
    },

    /// Count pagination anchors on the start page and POST for each listing
    Paginated {
        #[serde(rename = "start-url")]
        start_url: String,

        /// URL the listing pages are POSTed to
        endpoint: String,

        /// CSS selector matching one element per listing page
        selector: String,

        /// Form field carrying the listing page number
        #[serde(rename = "form-field", default = "default_form_field")]
        form_field: String,

        /// Session cookies that must not be sent with listing requests
        #[serde(rename = "skip-cookies", default)]
        skip_cookies: Vec<String>,
    },
}

fn default_form_field() -> String {
    "page".to_string()
}

impl SiteEntry {
    /// The URL the crawl of this site starts from
    pub fn start_url(&self) -> &str {
        match self {
            Self::Links { start_url } | Self::Paginated { start_url, .. } => start_url,
        }
    }
}
