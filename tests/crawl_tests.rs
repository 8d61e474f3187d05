//! Integration tests for the crawl engine
//!
//! These tests drive the coordinator and worker pool with an in-memory site
//! whose link graph, failures and visit delays are set per test.

use async_trait::async_trait;
use driftnet::config::BrowserConfig;
use driftnet::crawler::{crawl_site, Crawl, CrawlOptions, CrawlReport};
use driftnet::matcher::{spawn_sink, Matcher, WordMatcher};
use driftnet::site::{Page, Site};
use driftnet::{Browser, DriftError, UrlError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory site described by an adjacency list
#[derive(Debug, Default)]
struct GraphSite {
    links: HashMap<String, Vec<String>>,
    fail_visit: HashSet<String>,
    fail_extract: HashSet<String>,
    drop: HashSet<String>,
    panic_on: HashSet<String>,
    delay: Duration,
    visits: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl GraphSite {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        let links = edges
            .iter()
            .map(|(from, to)| (from.to_string(), to.iter().map(|t| t.to_string()).collect()))
            .collect();
        Self {
            links,
            ..Self::default()
        }
    }

    fn failing_visit(mut self, url: &str) -> Self {
        self.fail_visit.insert(url.to_string());
        self
    }

    fn failing_extract(mut self, url: &str) -> Self {
        self.fail_extract.insert(url.to_string());
        self
    }

    fn dropping(mut self, url: &str) -> Self {
        self.drop.insert(url.to_string());
        self
    }

    fn panicking(mut self, url: &str) -> Self {
        self.panic_on.insert(url.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn visit_counts(&self) -> HashMap<String, usize> {
        self.visits.lock().unwrap().clone()
    }

    fn page(self: &Arc<Self>, url: &str) -> GraphPage {
        GraphPage {
            url: url.to_string(),
            body: Vec::new(),
            site: Arc::clone(self),
        }
    }
}

#[derive(Debug)]
struct GraphPage {
    url: String,
    body: Vec<u8>,
    site: Arc<GraphSite>,
}

#[async_trait]
impl Site for GraphSite {
    type Page = GraphPage;

    async fn start(self: Arc<Self>, _browser: &Browser) -> Result<GraphPage, DriftError> {
        Ok(self.page("/s"))
    }

    async fn visit(
        &self,
        page: GraphPage,
        _browser: &Browser,
    ) -> Result<Option<GraphPage>, DriftError> {
        *self
            .visits
            .lock()
            .unwrap()
            .entry(page.url.clone())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on.contains(&page.url) {
            panic!("site blew up on {}", page.url);
        }
        if self.fail_visit.contains(&page.url) {
            return Err(DriftError::Status {
                url: page.url,
                status: 500,
            });
        }
        if self.drop.contains(&page.url) {
            return Ok(None);
        }

        let body = format!("page {}", page.url).into_bytes();
        Ok(Some(GraphPage { body, ..page }))
    }
}

impl Page for GraphPage {
    type Site = GraphSite;

    fn url(&self) -> &str {
        &self.url
    }

    fn pages(&self) -> Result<Vec<GraphPage>, DriftError> {
        if self.site.fail_extract.contains(&self.url) {
            return Err(DriftError::UrlError(UrlError::Resolve {
                href: self.url.clone(),
                message: "broken markup".to_string(),
            }));
        }
        Ok(self
            .site
            .links
            .get(&self.url)
            .map(|targets| targets.iter().map(|t| self.site.page(t)).collect())
            .unwrap_or_default())
    }

    fn contents(&self) -> &[u8] {
        &self.body
    }

    fn site(&self) -> Arc<GraphSite> {
        Arc::clone(&self.site)
    }
}

/// Matcher that never matches
struct NoMatch;

#[async_trait]
impl Matcher for NoMatch {
    fn matches(&self, _contents: &[u8]) -> bool {
        false
    }

    async fn put(&self, _url: String) {}
}

fn browser() -> Arc<Browser> {
    Arc::new(Browser::new(&BrowserConfig::default()).unwrap())
}

async fn crawl(site: &Arc<GraphSite>, workers: usize) -> CrawlReport {
    crawl_site(
        Arc::clone(site),
        browser(),
        Arc::new(NoMatch),
        CrawlOptions::new(workers),
    )
    .await
    .unwrap()
}

fn scenario() -> GraphSite {
    GraphSite::new(&[("/s", &["/a", "/b", "/a"]), ("/a", &["/c"])])
}

fn urls(report: &CrawlReport) -> Vec<&str> {
    report.urls().collect()
}

fn assert_settled(report: &CrawlReport) {
    assert_eq!(report.busy, 0);
    assert!(report.all_visited());
    assert_eq!(report.stats.dispatched, report.stats.completed());
}

#[tokio::test]
async fn test_scenario_every_page_visited_once() {
    let site = Arc::new(scenario());
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/c", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.extracted, 4);
    assert_eq!(report.stats.links_reported, 4);
    assert_eq!(report.stats.duplicate_links, 1);

    let visits = site.visit_counts();
    assert_eq!(visits.len(), 4);
    assert!(visits.values().all(|count| *count == 1));
}

#[tokio::test]
async fn test_scenario_with_failing_page() {
    let site = Arc::new(scenario().failing_visit("/b"));
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/c", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.visit_failures, 1);
    assert_eq!(report.stats.extracted, 3);
    assert_eq!(site.visit_counts().get("/b"), Some(&1));
}

#[tokio::test]
async fn test_extraction_failure_reports_no_links() {
    let site = Arc::new(scenario().failing_extract("/a"));
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.extraction_failures, 1);
    assert!(!site.visit_counts().contains_key("/c"));
}

#[tokio::test]
async fn test_dropped_page_not_expanded() {
    let site = Arc::new(scenario().dropping("/a"));
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.dropped, 1);
}

#[tokio::test]
async fn test_failing_seed_still_terminates() {
    let site = Arc::new(scenario().failing_visit("/s"));
    let report = crawl(&site, 3).await;

    assert_eq!(urls(&report), vec!["/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.visit_failures, 1);
}

#[tokio::test]
async fn test_seed_without_links() {
    let site = Arc::new(GraphSite::new(&[]));
    let report = crawl(&site, 4).await;

    assert_eq!(urls(&report), vec!["/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.dispatched, 1);
}

#[tokio::test]
async fn test_self_links_and_cycles() {
    let site = Arc::new(GraphSite::new(&[
        ("/s", &["/s", "/a"]),
        ("/a", &["/b", "/s"]),
        ("/b", &["/a", "/b"]),
    ]));
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/s"]);
    assert_settled(&report);
    assert!(site.visit_counts().values().all(|count| *count == 1));
}

#[tokio::test]
async fn test_in_flight_bounded_by_workers() {
    let children: Vec<String> = (0..40).map(|i| format!("/p{}", i)).collect();
    let children: Vec<&str> = children.iter().map(String::as_str).collect();
    let site = Arc::new(
        GraphSite::new(&[("/s", children.as_slice())]).with_delay(Duration::from_millis(5)),
    );

    let report = crawl(&site, 3).await;

    assert_eq!(report.frontier.len(), 41);
    assert_settled(&report);
    assert!(report.stats.peak_busy <= 3);
    let max = site.max_in_flight.load(Ordering::SeqCst);
    assert!((1..=3).contains(&max), "max in flight was {}", max);
}

#[tokio::test]
async fn test_single_worker_is_sequential() {
    let site = Arc::new(scenario().with_delay(Duration::from_millis(2)));
    let report = crawl(&site, 1).await;

    assert_settled(&report);
    assert_eq!(report.stats.peak_busy, 1);
    assert_eq!(site.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_graph_terminates() {
    const NODES: usize = 600;
    let names: Vec<String> = (0..NODES).map(|i| format!("/n{}", i)).collect();
    let mut site = GraphSite::default();
    for i in 0..NODES {
        let targets = [2 * i + 1, 2 * i + 2, i / 2, (i * 7) % NODES]
            .into_iter()
            .filter(|t| *t < NODES)
            .map(|t| names[t].clone())
            .collect();
        site.links.insert(names[i].clone(), targets);
    }
    site.links.insert("/s".to_string(), vec![names[0].clone()]);
    let site = Arc::new(site);

    let report = tokio::time::timeout(Duration::from_secs(30), crawl(&site, 8))
        .await
        .expect("crawl did not terminate");

    assert_eq!(report.frontier.len(), NODES + 1);
    assert_settled(&report);
    assert_eq!(report.stats.dispatched, (NODES + 1) as u64);
    assert!(site.visit_counts().values().all(|count| *count == 1));
}

#[tokio::test]
async fn test_panicking_visit_is_abandoned() {
    let site = Arc::new(scenario().panicking("/b"));
    let report = crawl(&site, 2).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/c", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.abandoned, 1);
    assert_eq!(report.stats.extracted, 3);
}

#[tokio::test]
async fn test_worker_survives_panicking_page() {
    let site = Arc::new(GraphSite::new(&[("/s", &["/a", "/b"])]).panicking("/a"));
    let report = crawl(&site, 1).await;

    assert_eq!(urls(&report), vec!["/a", "/b", "/s"]);
    assert_settled(&report);
    assert_eq!(report.stats.abandoned, 1);
    assert_eq!(report.stats.extracted, 2);

    let visits = site.visit_counts();
    assert_eq!(visits.get("/b"), Some(&1));
    assert_eq!(visits.len(), 3);
}

#[tokio::test]
async fn test_matches_reach_sink() {
    let site = Arc::new(scenario());
    let (sink, sink_task) = spawn_sink(1);
    let matcher: Arc<dyn Matcher> = Arc::new(WordMatcher::new(&["page /".to_string()], sink));

    let report = crawl_site(
        Arc::clone(&site),
        browser(),
        Arc::clone(&matcher),
        CrawlOptions::new(2),
    )
    .await
    .unwrap();
    drop(matcher);

    let hits = sink_task.finish().await.unwrap();
    let mut hit_urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
    hit_urls.sort_unstable();

    assert_eq!(hit_urls, vec!["/a", "/b", "/c", "/s"]);
    assert_eq!(report.stats.matched, 4);
}

#[tokio::test]
async fn test_only_matching_pages_recorded() {
    let site = Arc::new(scenario());
    let (sink, sink_task) = spawn_sink(4);
    let matcher: Arc<dyn Matcher> = Arc::new(WordMatcher::new(&["page /c".to_string()], sink));

    let report = crawl_site(
        Arc::clone(&site),
        browser(),
        Arc::clone(&matcher),
        CrawlOptions::new(3),
    )
    .await
    .unwrap();
    drop(matcher);

    let hits = sink_task.finish().await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "/c");
    assert_eq!(report.stats.matched, 1);
}

#[tokio::test]
async fn test_start_from_explicit_seed() {
    let site = Arc::new(scenario());
    let seed = site.page("/a");

    let report = Crawl::start(seed, CrawlOptions::new(2), browser(), Arc::new(NoMatch))
        .wait()
        .await;

    assert_eq!(urls(&report), vec!["/a", "/c"]);
    assert_settled(&report);
}

#[test]
fn test_options_clamp_workers() {
    assert_eq!(CrawlOptions::new(0).workers, 1);
    assert_eq!(CrawlOptions::new(7).workers, 7);
}
