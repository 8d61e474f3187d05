//! Site and page capabilities consumed by the crawler
//!
//! A [`Site`] knows how to produce its start page and how to fetch a page.
//! A [`Page`] knows its URL, exposes its fetched contents, and turns itself
//! into the pages it links to. The crawler only ever calls these operations;
//! each site pairs itself with its own page type through associated types,
//! so no downcasting is needed. A site with several kinds of page models
//! them as an enum.
//!
//! Two sites are provided:
//! - [`LinkSite`]: follows same-host `<a href>` links from a start URL
//! - [`PaginatedSite`]: fetches every listing page of a paginated catalogue

mod html;
mod links;
mod paginated;

pub use html::{count_matches, extract_hrefs};
pub use links::{LinkPage, LinkSite};
pub use paginated::{PaginatedPage, PaginatedSite};

use crate::browser::Browser;
use crate::config::SiteEntry;
use crate::DriftError;
use async_trait::async_trait;
use std::sync::Arc;

/// A crawlable site
#[async_trait]
pub trait Site: Send + Sync + 'static {
    /// The page type this site produces and visits
    type Page: Page<Site = Self>;

    /// Produces the seed page of a crawl
    async fn start(self: Arc<Self>, browser: &Browser) -> Result<Self::Page, DriftError>;

    /// Fetches `page`
    ///
    /// Returns `Ok(None)` when the page should be dropped without further
    /// processing.
    async fn visit(
        &self,
        page: Self::Page,
        browser: &Browser,
    ) -> Result<Option<Self::Page>, DriftError>;
}

/// A page of a [`Site`]
pub trait Page: Send + Sync + Sized + 'static {
    /// The site owning this page
    type Site: Site<Page = Self>;

    /// Unique identity of the page within a crawl
    fn url(&self) -> &str;

    /// Pages linked from this page, available after a successful visit
    fn pages(&self) -> Result<Vec<Self>, DriftError>;

    /// Raw fetched contents (empty before the visit)
    fn contents(&self) -> &[u8];

    /// The site this page belongs to
    fn site(&self) -> Arc<Self::Site>;
}

/// A configured site ready to be crawled
#[derive(Debug, Clone)]
pub enum ConfiguredSite {
    Links(Arc<LinkSite>),
    Paginated(Arc<PaginatedSite>),
}

impl ConfiguredSite {
    /// Builds the site described by a configuration entry
    pub fn from_entry(entry: &SiteEntry) -> Result<Self, DriftError> {
        let site = match entry {
            SiteEntry::Links { start_url } => Self::Links(Arc::new(LinkSite::new(start_url)?)),
            SiteEntry::Paginated {
                start_url,
                endpoint,
                selector,
                form_field,
                skip_cookies,
            } => Self::Paginated(Arc::new(
                PaginatedSite::new(start_url, endpoint, selector)?
                    .with_form_field(form_field)
                    .with_skip_cookies(skip_cookies.clone()),
            )),
        };
        Ok(site)
    }

    /// The URL the crawl starts from
    pub fn start_url(&self) -> &str {
        match self {
            Self::Links(site) => site.start_url().as_str(),
            Self::Paginated(site) => site.start_url().as_str(),
        }
    }
}
