//! HTTP transport shared by all workers
//!
//! The browser keeps one cookie jar for the whole run so a site can open a
//! session on its start page and reuse it for later requests. Cookies are
//! attached by hand instead of through the client's cookie provider, which
//! lets a request leave out cookies that would confuse the server.

use crate::config::BrowserConfig;
use crate::DriftError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used by the browser
///
/// # Example
///
/// ```no_run
/// use driftnet::browser::build_http_client;
/// use driftnet::config::BrowserConfig;
///
/// let client = build_http_client(&BrowserConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Cookie-keeping HTTP client handed to every site visit
#[derive(Debug)]
pub struct Browser {
    client: Client,
    jar: Arc<Jar>,
    accept_language: String,
}

impl Browser {
    /// Creates a browser with an empty cookie jar
    pub fn new(config: &BrowserConfig) -> Result<Self, DriftError> {
        Ok(Self {
            client: build_http_client(config)?,
            jar: Arc::new(Jar::default()),
            accept_language: config.accept_language.clone(),
        })
    }

    /// Fetches `url` with a GET request and returns the body
    ///
    /// All session cookies for the URL are sent. Any status other than
    /// 200 OK is an error.
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, DriftError> {
        let target = Url::parse(url)?;
        let request = self.client.get(target.clone());
        self.send(request, &target, &target, &[]).await
    }

    /// POSTs a urlencoded form to `url` and returns the body
    ///
    /// The session cookies sent are the ones stored for `session`, usually
    /// the page that opened the session, so cookies scoped to that page's
    /// path reach an endpoint elsewhere on the host. Cookies named in
    /// `skip_cookies` are left out of the request.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, String)],
        session: &Url,
        skip_cookies: &[String],
    ) -> Result<Vec<u8>, DriftError> {
        let target = Url::parse(url)?;
        let request = self.client.post(target.clone()).form(form);
        self.send(request, &target, session, skip_cookies).await
    }

    /// Returns the names of the session cookies stored for `url`
    pub fn cookie_names(&self, url: &Url) -> Vec<String> {
        self.cookie_pairs(url, &[])
            .iter()
            .filter_map(|pair| pair.split('=').next())
            .map(|name| name.trim().to_string())
            .collect()
    }

    async fn send(
        &self,
        request: RequestBuilder,
        url: &Url,
        session: &Url,
        skip_cookies: &[String],
    ) -> Result<Vec<u8>, DriftError> {
        let mut request = request.header(ACCEPT_LANGUAGE, self.accept_language.as_str());

        let cookies = self.cookie_pairs(session, skip_cookies);
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookies.join("; "));
        }

        let response = request.send().await.map_err(|source| DriftError::Http {
            url: url.to_string(),
            source,
        })?;

        self.jar
            .set_cookies(&mut response.headers().get_all(SET_COOKIE).iter(), response.url());

        let status = response.status();
        let body = response.bytes().await.map_err(|source| DriftError::Http {
            url: url.to_string(),
            source,
        })?;

        if status != StatusCode::OK {
            return Err(DriftError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::trace!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }

    /// Returns the `name=value` pairs stored for `url`, minus `skip`
    fn cookie_pairs(&self, url: &Url, skip: &[String]) -> Vec<String> {
        let Some(header) = self.jar.cookies(url) else {
            return Vec::new();
        };
        let Ok(header) = header.to_str() else {
            return Vec::new();
        };

        header
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let name = pair.split('=').next().unwrap_or_default();
                !skip.iter().any(|s| s == name)
            })
            .map(str::to_string)
            .collect()
    }
}
