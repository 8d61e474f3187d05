use crate::browser::Browser;
use crate::site::html::count_matches;
use crate::site::{Page, Site};
use crate::{ConfigError, DriftError};
use async_trait::async_trait;
use scraper::Selector;
use std::sync::Arc;
use url::Url;

/// Site whose catalogue is split into listing pages loaded by form POSTs
///
/// The start page carries one pagination element per listing page. Fetching
/// the start page opens the session; every listing page is then requested by
/// POSTing its number to the listing endpoint with the session cookies.
#[derive(Debug)]
pub struct PaginatedSite {
    start_url: Url,
    endpoint: Url,
    selector: Selector,
    form_field: String,
    skip_cookies: Vec<String>,
}

impl PaginatedSite {
    pub fn new(start_url: &str, endpoint: &str, selector: &str) -> Result<Self, DriftError> {
        let selector = Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e))
        })?;

        Ok(Self {
            start_url: Url::parse(start_url)?,
            endpoint: Url::parse(endpoint)?,
            selector,
            form_field: "page".to_string(),
            skip_cookies: Vec::new(),
        })
    }

    /// Sets the form field carrying the listing page number
    pub fn with_form_field(mut self, form_field: &str) -> Self {
        self.form_field = form_field.to_string();
        self
    }

    /// Sets the session cookies left out of listing requests
    pub fn with_skip_cookies(mut self, skip_cookies: Vec<String>) -> Self {
        self.skip_cookies = skip_cookies;
        self
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    /// Identity of listing page `number`
    pub fn listing_url(&self, number: usize) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(&self.form_field, &number.to_string());
        url.to_string()
    }
}

/// A page of a [`PaginatedSite`]
#[derive(Debug)]
pub enum PaginatedPage {
    /// The start page listing the pagination elements
    Index {
        body: Vec<u8>,
        site: Arc<PaginatedSite>,
    },

    /// One listing page
    Listing {
        number: usize,
        url: String,
        body: Vec<u8>,
        site: Arc<PaginatedSite>,
    },
}

impl PaginatedPage {
    fn listing(number: usize, site: Arc<PaginatedSite>) -> Self {
        Self::Listing {
            number,
            url: site.listing_url(number),
            body: Vec::new(),
            site,
        }
    }
}

#[async_trait]
impl Site for PaginatedSite {
    type Page = PaginatedPage;

    async fn start(self: Arc<Self>, browser: &Browser) -> Result<PaginatedPage, DriftError> {
        let body = browser.get(self.start_url.as_str()).await?;
        Ok(PaginatedPage::Index { body, site: self })
    }

    async fn visit(
        &self,
        page: PaginatedPage,
        browser: &Browser,
    ) -> Result<Option<PaginatedPage>, DriftError> {
        match page {
            PaginatedPage::Index { site, .. } => {
                let body = browser.get(self.start_url.as_str()).await?;
                Ok(Some(PaginatedPage::Index { body, site }))
            }
            PaginatedPage::Listing {
                number, url, site, ..
            } => {
                let form = [(self.form_field.as_str(), number.to_string())];
                let body = browser
                    .post_form(
                        self.endpoint.as_str(),
                        &form,
                        &self.start_url,
                        &self.skip_cookies,
                    )
                    .await?;
                Ok(Some(PaginatedPage::Listing {
                    number,
                    url,
                    body,
                    site,
                }))
            }
        }
    }
}

impl Page for PaginatedPage {
    type Site = PaginatedSite;

    fn url(&self) -> &str {
        match self {
            Self::Index { site, .. } => site.start_url.as_str(),
            Self::Listing { url, .. } => url.as_str(),
        }
    }

    fn pages(&self) -> Result<Vec<PaginatedPage>, DriftError> {
        match self {
            Self::Index { body, site } => {
                let html = String::from_utf8_lossy(body);
                let count = count_matches(&html, &site.selector);
                tracing::debug!("{} lists {} pages", site.start_url, count);
                Ok((1..=count)
                    .map(|number| PaginatedPage::listing(number, Arc::clone(site)))
                    .collect())
            }
            Self::Listing { .. } => Ok(Vec::new()),
        }
    }

    fn contents(&self) -> &[u8] {
        match self {
            Self::Index { body, .. } | Self::Listing { body, .. } => body.as_slice(),
        }
    }

    fn site(&self) -> Arc<PaginatedSite> {
        match self {
            Self::Index { site, .. } | Self::Listing { site, .. } => Arc::clone(site),
        }
    }
}
