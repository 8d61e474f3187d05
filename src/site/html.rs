//! HTML helpers shared by the site adapters
//!
//! Documents are parsed with `scraper`. Parsing is lenient: malformed markup
//! still yields a document, so these helpers do not fail.

use scraper::{Html, Selector};

/// Returns the `href` of every `<a>` element, in document order
///
/// Anchors carrying a `download` attribute are skipped since they point at
/// files rather than pages.
///
/// # Example
///
/// ```
/// use driftnet::site::extract_hrefs;
///
/// let html = r#"<a href="/a">A</a><a href="/f.pdf" download>F</a>"#;
/// assert_eq!(extract_hrefs(html), vec!["/a".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Counts the elements of `html` matching `selector`
pub fn count_matches(html: &str, selector: &Selector) -> usize {
    Html::parse_document(html).select(selector).count()
}
