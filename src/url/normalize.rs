use crate::UrlError;
use url::Url;

/// Link prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a link found on `base` into a crawlable same-host URL
///
/// # Normalization Steps
///
/// 1. Skip empty, fragment-only and `javascript:`/`mailto:`/`tel:`/`data:` links
/// 2. Resolve the link against `base`
/// 3. Skip non-HTTP(S) URLs and URLs on another host
/// 4. Reject a scheme that differs from `base` (same host, other protocol)
/// 5. Skip URLs on another port
/// 6. Normalize the path: collapse `//`, remove `.`/`..`, drop trailing slash
/// 7. Remove the fragment
///
/// # Returns
///
/// * `Ok(Some(Url))` - The normalized link
/// * `Ok(None)` - The link points outside the crawl and is ignored
/// * `Err(UrlError)` - The link cannot be resolved or changes protocol
///
/// # Examples
///
/// ```
/// use driftnet::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/shop/").unwrap();
/// let link = normalize_link(&base, "items/../bikes/#top").unwrap().unwrap();
/// assert_eq!(link.as_str(), "https://example.com/shop/bikes");
///
/// assert!(normalize_link(&base, "https://other.com/").unwrap().is_none());
/// ```
pub fn normalize_link(base: &Url, href: &str) -> Result<Option<Url>, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return Ok(None);
    }

    let mut url = base.join(href).map_err(|e| UrlError::Resolve {
        href: href.to_string(),
        message: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Ok(None);
    }

    if url.host_str() != base.host_str() {
        return Ok(None);
    }

    if url.scheme() != base.scheme() {
        return Err(UrlError::SchemeMismatch {
            found: url.scheme().to_string(),
            expected: base.scheme().to_string(),
        });
    }

    if url.port_or_known_default() != base.port_or_known_default() {
        return Ok(None);
    }

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    Ok(Some(url))
}

/// Removes empty and dot segments and the trailing slash (except for root)
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}
