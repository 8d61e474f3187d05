use crate::DriftError;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A matched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// URL of the matching page
    pub url: String,

    /// When the sink recorded the match
    pub found_at: DateTime<Utc>,
}

/// Sending side of the hit sink
///
/// Cheap to clone; the sink task runs until every clone is dropped.
#[derive(Debug, Clone)]
pub struct MatchSink {
    tx: mpsc::Sender<String>,
}

impl MatchSink {
    /// Queues `url` for the sink, waiting while the queue is full
    pub async fn record(&self, url: String) -> Result<(), DriftError> {
        self.tx
            .send(url)
            .await
            .map_err(|e| DriftError::Sink(format!("sink closed before {} was recorded", e.0)))
    }
}

/// Handle on the running sink task
#[derive(Debug)]
pub struct SinkTask {
    handle: JoinHandle<Vec<Hit>>,
}

impl SinkTask {
    /// Waits for the sink to drain and returns every recorded hit
    ///
    /// Completes once all [`MatchSink`] clones have been dropped.
    pub async fn finish(self) -> Result<Vec<Hit>, DriftError> {
        self.handle
            .await
            .map_err(|e| DriftError::Sink(format!("sink task failed: {}", e)))
    }
}

/// Spawns the sink task with a queue of `capacity` pending hits
pub fn spawn_sink(capacity: usize) -> (MatchSink, SinkTask) {
    let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

    let handle = tokio::spawn(async move {
        let mut hits = Vec::new();
        while let Some(url) = rx.recv().await {
            tracing::info!("MATCH {}", url);
            hits.push(Hit {
                url,
                found_at: Utc::now(),
            });
        }
        tracing::debug!("Sink closed after {} hits", hits.len());
        hits
    });

    (MatchSink { tx }, SinkTask { handle })
}
