use crate::browser::Browser;
use crate::site::html::extract_hrefs;
use crate::site::{Page, Site};
use crate::url::normalize_link;
use crate::{ConfigError, DriftError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Site that follows `<a href>` links without leaving the start host
#[derive(Debug)]
pub struct LinkSite {
    start_url: Url,
}

impl LinkSite {
    /// Creates a site starting at `start_url`
    ///
    /// The start URL is normalized like every discovered link, so a link
    /// back to it shares its frontier entry.
    pub fn new(start_url: &str) -> Result<Self, DriftError> {
        let parsed = Url::parse(start_url)?;
        let start_url = normalize_link(&parsed, parsed.as_str())?
            .ok_or_else(|| ConfigError::InvalidUrl(start_url.to_string()))?;

        Ok(Self { start_url })
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }
}

/// A page of a [`LinkSite`], unfetched until visited
#[derive(Debug)]
pub struct LinkPage {
    url: Url,
    body: Vec<u8>,
    site: Arc<LinkSite>,
}

impl LinkPage {
    fn unfetched(url: Url, site: Arc<LinkSite>) -> Self {
        Self {
            url,
            body: Vec::new(),
            site,
        }
    }
}

#[async_trait]
impl Site for LinkSite {
    type Page = LinkPage;

    async fn start(self: Arc<Self>, _browser: &Browser) -> Result<LinkPage, DriftError> {
        Ok(LinkPage::unfetched(self.start_url.clone(), self))
    }

    async fn visit(
        &self,
        page: LinkPage,
        browser: &Browser,
    ) -> Result<Option<LinkPage>, DriftError> {
        let body = browser.get(page.url.as_str()).await?;
        Ok(Some(LinkPage { body, ..page }))
    }
}

impl Page for LinkPage {
    type Site = LinkSite;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    fn pages(&self) -> Result<Vec<LinkPage>, DriftError> {
        let html = String::from_utf8_lossy(&self.body);
        let mut seen = HashSet::new();
        let mut pages = Vec::new();

        for href in extract_hrefs(&html) {
            match normalize_link(&self.url, &href) {
                Ok(Some(url)) => {
                    if seen.insert(url.to_string()) {
                        pages.push(LinkPage::unfetched(url, Arc::clone(&self.site)));
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("Skipping link on {}: {}", self.url, e),
            }
        }

        Ok(pages)
    }

    fn contents(&self) -> &[u8] {
        &self.body
    }

    fn site(&self) -> Arc<LinkSite> {
        Arc::clone(&self.site)
    }
}
