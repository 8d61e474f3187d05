//! Concurrent crawl engine
//!
//! This module contains the core crawling logic, including:
//! - The frontier of discovered URLs and their visit state
//! - The coordinator task that owns the frontier and dispatches pages
//! - The worker pool that visits pages and extracts their links
//! - Completion reporting and crawl statistics

mod coordinator;
mod frontier;
mod report;
mod worker;

pub use coordinator::{Crawl, CrawlOptions};
pub use frontier::Frontier;
pub use report::{CrawlReport, CrawlStats, TaskOutcome};

use crate::browser::Browser;
use crate::matcher::Matcher;
use crate::site::Site;
use crate::DriftError;
use std::sync::Arc;

/// Crawls one site to completion
///
/// Fetches the site's start page, then crawls outward from it until every
/// discovered page has been processed.
///
/// # Arguments
///
/// * `site` - The site to crawl
/// * `browser` - HTTP session shared by every worker
/// * `matcher` - Relevance test and hit recorder
/// * `options` - Worker count
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed; page-level failures are counted in the report
/// * `Err(DriftError)` - The start page could not be produced
pub async fn crawl_site<S: Site>(
    site: Arc<S>,
    browser: Arc<Browser>,
    matcher: Arc<dyn Matcher>,
    options: CrawlOptions,
) -> Result<CrawlReport, DriftError> {
    let seed = site.start(&browser).await?;
    let crawl = Crawl::start(seed, options, browser, matcher);
    Ok(crawl.wait().await)
}
