use std::collections::BTreeMap;
use std::time::Duration;

/// How a worker finished one dispatched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Visited and its links extracted (possibly none)
    Extracted,

    /// The site asked for the page to be dropped after visiting
    Dropped,

    /// Fetching or visiting the page failed
    VisitFailed,

    /// The page was fetched but its links could not be extracted
    ExtractFailed,

    /// The task ended without a proper report
    Abandoned,
}

/// Counters collected by the coordinator over one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Pages handed to the worker pool
    pub dispatched: u64,

    /// Pages visited with links extracted
    pub extracted: u64,

    /// Pages dropped by their site
    pub dropped: u64,

    /// Pages whose visit failed
    pub visit_failures: u64,

    /// Pages whose link extraction failed
    pub extraction_failures: u64,

    /// Tasks that ended without a report, or could not be dispatched
    pub abandoned: u64,

    /// Pages whose contents matched
    pub matched: u64,

    /// Links reported by workers, duplicates included
    pub links_reported: u64,

    /// Reported links whose URL was already known
    pub duplicate_links: u64,

    /// Highest number of simultaneously dispatched pages
    pub peak_busy: usize,

    /// Wall time from start to completion
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Dispatched pages that have been reported back
    pub fn completed(&self) -> u64 {
        self.extracted + self.dropped + self.visit_failures + self.extraction_failures + self.abandoned
    }

    /// Pages that ended in an error
    pub fn failures(&self) -> u64 {
        self.visit_failures + self.extraction_failures + self.abandoned
    }

    pub(crate) fn record(&mut self, outcome: TaskOutcome, matched: bool) {
        match outcome {
            TaskOutcome::Extracted => self.extracted += 1,
            TaskOutcome::Dropped => self.dropped += 1,
            TaskOutcome::VisitFailed => self.visit_failures += 1,
            TaskOutcome::ExtractFailed => self.extraction_failures += 1,
            TaskOutcome::Abandoned => self.abandoned += 1,
        }
        if matched {
            self.matched += 1;
        }
    }
}

/// Final state of a crawl, delivered when it completes
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every discovered URL and whether it was dispatched
    pub frontier: BTreeMap<String, bool>,

    /// Pages still dispatched when the coordinator stopped (0 on completion)
    pub busy: usize,

    pub stats: CrawlStats,
}

impl CrawlReport {
    /// Discovered URLs in sorted order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.frontier.keys().map(String::as_str)
    }

    /// True if `url` was discovered and dispatched
    pub fn is_visited(&self, url: &str) -> bool {
        self.frontier.get(url).copied().unwrap_or(false)
    }

    /// True if every discovered URL was dispatched
    pub fn all_visited(&self) -> bool {
        self.frontier.values().all(|visited| *visited)
    }
}
