use crate::browser::Browser;
use crate::crawler::coordinator::{Completion, Reporter};
use crate::crawler::report::TaskOutcome;
use crate::matcher::Matcher;
use crate::site::{Page, Site};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Spawns `count` workers pulling pages from `queue`
///
/// Each worker exits once the queue is closed and empty. A page whose
/// processing panics is reported as abandoned and the worker moves on.
pub(crate) fn spawn_workers<P: Page>(
    count: usize,
    queue: kanal::AsyncReceiver<P>,
    reporter: &Reporter<P>,
    browser: Arc<Browser>,
    matcher: Arc<dyn Matcher>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let worker = Worker {
                id,
                queue: queue.clone(),
                reporter: reporter.clone(),
                browser: Arc::clone(&browser),
                matcher: Arc::clone(&matcher),
            };
            tokio::spawn(worker.run())
        })
        .collect()
}

struct Worker<P> {
    id: usize,
    queue: kanal::AsyncReceiver<P>,
    reporter: Reporter<P>,
    browser: Arc<Browser>,
    matcher: Arc<dyn Matcher>,
}

impl<P: Page> Worker<P> {
    async fn run(self) {
        tracing::trace!("Worker {} started", self.id);

        while let Ok(page) = self.queue.recv().await {
            let ticket = self.reporter.ticket();
            let url = page.url().to_string();

            let completion = match AssertUnwindSafe(self.process(page)).catch_unwind().await {
                Ok(completion) => completion,
                Err(panic) => {
                    tracing::error!(
                        "Worker {} panicked on {}: {}",
                        self.id,
                        url,
                        panic_message(&panic)
                    );
                    Completion::empty(TaskOutcome::Abandoned, false)
                }
            };
            ticket.done(completion);
        }

        tracing::trace!("Worker {} stopped", self.id);
    }

    /// Visits one page and collects what it links to
    async fn process(&self, page: P) -> Completion<P> {
        let url = page.url().to_string();
        let site = page.site();

        let page = match site.visit(page, &self.browser).await {
            Ok(Some(page)) => page,
            Ok(None) => {
                tracing::debug!("Dropped {}", url);
                return Completion::empty(TaskOutcome::Dropped, false);
            }
            Err(e) => {
                tracing::warn!("Failed to visit {}: {}", url, e);
                return Completion::empty(TaskOutcome::VisitFailed, false);
            }
        };

        let matched = self.matcher.matches(page.contents());
        if matched {
            self.matcher.put(page.url().to_string()).await;
        }

        match page.pages() {
            Ok(links) => {
                tracing::debug!("Visited {} ({} links)", url, links.len());
                Completion {
                    links,
                    outcome: TaskOutcome::Extracted,
                    matched,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to extract links from {}: {}", url, e);
                Completion::empty(TaskOutcome::ExtractFailed, matched)
            }
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
