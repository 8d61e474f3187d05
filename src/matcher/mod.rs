//! Content matching and the hit sink
//!
//! Workers test every fetched page with a [`Matcher`] and hand the URLs of
//! matching pages to it. The provided [`WordMatcher`] forwards them to a
//! [`MatchSink`], a bounded queue drained by its own task, so recording a hit
//! never waits on the crawl coordinator.

mod sink;

pub use sink::{spawn_sink, Hit, MatchSink, SinkTask};

use async_trait::async_trait;

/// Relevance test and hit recorder used by the workers
#[async_trait]
pub trait Matcher: Send + Sync {
    /// Returns true if `contents` is relevant
    fn matches(&self, contents: &[u8]) -> bool;

    /// Records the URL of a relevant page
    ///
    /// May wait briefly for room in the sink. Failures are logged by the
    /// implementation and never reach the crawl.
    async fn put(&self, url: String);
}

/// Matches pages containing every configured word
#[derive(Debug, Clone)]
pub struct WordMatcher {
    words: Vec<Vec<u8>>,
    sink: MatchSink,
}

impl WordMatcher {
    pub fn new(words: &[String], sink: MatchSink) -> Self {
        Self {
            words: words.iter().map(|w| w.as_bytes().to_vec()).collect(),
            sink,
        }
    }
}

#[async_trait]
impl Matcher for WordMatcher {
    fn matches(&self, contents: &[u8]) -> bool {
        self.words.iter().all(|word| contains(contents, word))
    }

    async fn put(&self, url: String) {
        if let Err(e) = self.sink.record(url).await {
            tracing::warn!("Dropping match: {}", e);
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
