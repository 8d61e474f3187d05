//! Crawl coordinator - single owner of the frontier
//!
//! The coordinator is one task draining a command queue. Workers never touch
//! the frontier: they send a completion report, and the coordinator applies
//! reports one at a time, so no lock guards the crawl state.
//!
//! After each applied command the coordinator dispatches pending pages until
//! every worker slot is taken, then checks for completion: nothing pending
//! and no page dispatched. Completion is only ever checked here, right after
//! a command has been fully applied, so a report that is still queued always
//! keeps the crawl alive.

use crate::browser::Browser;
use crate::crawler::frontier::Frontier;
use crate::crawler::report::{CrawlReport, CrawlStats, TaskOutcome};
use crate::crawler::worker::spawn_workers;
use crate::matcher::Matcher;
use crate::site::Page;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Completed pages between two progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// What a worker reports after processing one page
#[derive(Debug)]
pub(crate) struct Completion<P> {
    pub links: Vec<P>,
    pub outcome: TaskOutcome,
    pub matched: bool,
}

impl<P> Completion<P> {
    /// A report carrying no links
    pub fn empty(outcome: TaskOutcome, matched: bool) -> Self {
        Self {
            links: Vec::new(),
            outcome,
            matched,
        }
    }
}

/// Commands applied by the coordinator, in arrival order
#[derive(Debug)]
pub(crate) enum Command<P> {
    /// Run a scheduling pass
    Schedule,

    /// A worker finished one dispatched page
    Done(Completion<P>),
}

/// Worker-side handle for sending reports to the coordinator
#[derive(Debug)]
pub(crate) struct Reporter<P> {
    commands: mpsc::UnboundedSender<Command<P>>,
}

impl<P> Clone for Reporter<P> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<P> Reporter<P> {
    fn send(&self, command: Command<P>) {
        if self.commands.send(command).is_err() {
            tracing::error!("Coordinator stopped, command lost");
        }
    }

    fn schedule(&self) {
        self.send(Command::Schedule);
    }

    /// Opens the report obligation for one dispatched page
    pub fn ticket(&self) -> Ticket<P> {
        Ticket {
            reporter: Some(self.clone()),
        }
    }
}

/// Obligation to report exactly once for a dispatched page
///
/// Dropping an unused ticket (for example when a worker task is aborted
/// mid-page) reports the page as abandoned, keeping the busy count exact.
#[derive(Debug)]
pub(crate) struct Ticket<P> {
    reporter: Option<Reporter<P>>,
}

impl<P> Ticket<P> {
    /// Sends the report, consuming the ticket
    pub fn done(mut self, completion: Completion<P>) {
        if let Some(reporter) = self.reporter.take() {
            reporter.send(Command::Done(completion));
        }
    }
}

impl<P> Drop for Ticket<P> {
    fn drop(&mut self) {
        if let Some(reporter) = self.reporter.take() {
            tracing::warn!("Task ended without reporting, marking page abandoned");
            reporter.send(Command::Done(Completion::empty(TaskOutcome::Abandoned, false)));
        }
    }
}

/// Crawl state, owned by the coordinator task
struct Coordinator<P> {
    frontier: Frontier<P>,
    busy: usize,
    workers: usize,
    dispatch: kanal::AsyncSender<P>,
    stats: CrawlStats,
    started: Instant,
}

impl<P: Page> Coordinator<P> {
    fn new(seed: P, workers: usize, dispatch: kanal::AsyncSender<P>) -> Self {
        let mut frontier = Frontier::new();
        frontier.discover(seed.url().to_string(), seed);

        Self {
            frontier,
            busy: 0,
            workers,
            dispatch,
            stats: CrawlStats::default(),
            started: Instant::now(),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command<P>>,
        finished: oneshot::Sender<CrawlReport>,
    ) {
        while let Some(command) = commands.recv().await {
            self.apply(command);
            if self.frontier.has_pending() {
                self.schedule().await;
            }
            if self.is_complete() {
                break;
            }
        }

        if !self.is_complete() {
            tracing::error!(
                "Command queue closed with {} pages dispatched and {} pending",
                self.busy,
                self.frontier.pending_len()
            );
        }

        let report = self.finish();
        tracing::info!(
            "Crawl complete: {} URLs discovered, {} pages processed in {:?}",
            report.frontier.len(),
            report.stats.completed(),
            report.stats.elapsed
        );

        if finished.send(report).is_err() {
            tracing::debug!("Crawl handle dropped before completion");
        }
    }

    fn is_complete(&self) -> bool {
        !self.frontier.has_pending() && self.busy == 0
    }

    fn apply(&mut self, command: Command<P>) {
        let completion = match command {
            Command::Schedule => return,
            Command::Done(completion) => completion,
        };

        match self.busy.checked_sub(1) {
            Some(busy) => self.busy = busy,
            None => tracing::error!("Completion report without a dispatched page, ignoring"),
        }
        self.stats.record(completion.outcome, completion.matched);

        for page in completion.links {
            self.stats.links_reported += 1;
            let url = page.url().to_string();
            if !self.frontier.discover(url, page) {
                self.stats.duplicate_links += 1;
            }
        }

        let completed = self.stats.completed();
        if completed % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            let rate = completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            tracing::info!(
                "Progress: {} pages done, {} in frontier, {} busy, {:.2} pages/sec",
                completed,
                self.frontier.len(),
                self.busy,
                rate
            );
        }
    }

    /// Dispatches pending pages until every worker slot is taken
    ///
    /// The dispatch queue holds at most `busy` pages, and `busy` stays below
    /// its capacity here, so pushing never waits on the workers.
    async fn schedule(&mut self) {
        while self.busy < self.workers {
            let Some(page) = self.frontier.next_pending() else {
                break;
            };
            let url = page.url().to_string();

            self.busy += 1;
            self.stats.dispatched += 1;
            self.stats.peak_busy = self.stats.peak_busy.max(self.busy);

            match self.dispatch.send(page).await {
                Ok(()) => tracing::debug!("Dispatched {}", url),
                Err(e) => {
                    tracing::error!("Failed to dispatch {}: {}", url, e);
                    self.busy -= 1;
                    self.stats.abandoned += 1;
                }
            }
        }
    }

    /// Closes the dispatch queue and builds the report
    fn finish(self) -> CrawlReport {
        let Self {
            frontier,
            busy,
            dispatch,
            mut stats,
            started,
            ..
        } = self;

        // Workers exit once the queue is closed and drained
        drop(dispatch);
        stats.elapsed = started.elapsed();

        CrawlReport {
            frontier: frontier.into_visit_map(),
            busy,
            stats,
        }
    }
}

/// Settings for one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Number of workers, also the bound on dispatched pages
    pub workers: usize,
}

impl CrawlOptions {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl From<&crate::config::CrawlerConfig> for CrawlOptions {
    fn from(config: &crate::config::CrawlerConfig) -> Self {
        Self::new(config.workers as usize)
    }
}

/// A running crawl
#[derive(Debug)]
pub struct Crawl {
    finished: oneshot::Receiver<CrawlReport>,
    coordinator: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl Crawl {
    /// Starts crawling from `seed`
    ///
    /// Spawns the worker pool and the coordinator, and queues the first
    /// scheduling pass. Must be called within a tokio runtime.
    pub fn start<P: Page>(
        seed: P,
        options: CrawlOptions,
        browser: Arc<Browser>,
        matcher: Arc<dyn Matcher>,
    ) -> Self {
        let workers = options.workers.max(1);
        tracing::info!("Starting crawl of {} with {} workers", seed.url(), workers);

        let (dispatch_tx, dispatch_rx) = kanal::bounded_async::<P>(workers);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (finished_tx, finished_rx) = oneshot::channel();

        let reporter = Reporter {
            commands: command_tx,
        };
        let worker_handles = spawn_workers(workers, dispatch_rx, &reporter, browser, matcher);

        let coordinator = Coordinator::new(seed, workers, dispatch_tx);
        let coordinator = tokio::spawn(coordinator.run(command_rx, finished_tx));

        reporter.schedule();

        Self {
            finished: finished_rx,
            coordinator,
            workers: worker_handles,
        }
    }

    /// Waits until the crawl has no work left and every worker has exited
    pub async fn wait(self) -> CrawlReport {
        let report = match self.finished.await {
            Ok(report) => report,
            Err(_) => {
                tracing::error!("Coordinator stopped without a report");
                CrawlReport::default()
            }
        };

        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::warn!("Worker task failed: {}", e);
            }
        }
        if let Err(e) = self.coordinator.await {
            tracing::warn!("Coordinator task failed: {}", e);
        }

        report
    }
}
