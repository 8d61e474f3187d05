//! Crawl statistics display
//!
//! Prints the report of a finished crawl to stdout.

use crate::crawler::CrawlReport;

/// Prints a crawl report to stdout in a formatted manner
///
/// # Arguments
///
/// * `site` - Start URL of the crawled site, used as the heading
/// * `report` - The report to display
pub fn print_report(site: &str, report: &CrawlReport) {
    let stats = &report.stats;

    println!("=== Crawl of {} ===\n", site);

    println!("Overview:");
    println!("  URLs discovered: {}", report.frontier.len());
    println!("  Pages dispatched: {}", stats.dispatched);
    println!("  Peak concurrent pages: {}", stats.peak_busy);
    println!(
        "  Links reported: {} ({} duplicates)",
        stats.links_reported, stats.duplicate_links
    );
    println!("  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Pages by Outcome:");
    for (label, count) in [
        ("Extracted", stats.extracted),
        ("Dropped", stats.dropped),
        ("Visit failed", stats.visit_failures),
        ("Extraction failed", stats.extraction_failures),
        ("Abandoned", stats.abandoned),
    ] {
        if count > 0 {
            println!("  {}: {} ({:.1}%)", label, count, percentage(count, stats.completed()));
        }
    }
    println!();

    let unvisited: Vec<&str> = report
        .frontier
        .iter()
        .filter(|(_, visited)| !**visited)
        .map(|(url, _)| url.as_str())
        .collect();
    if !unvisited.is_empty() {
        println!("Never Dispatched ({}):", unvisited.len());
        for url in unvisited {
            println!("  - {}", url);
        }
        println!();
    }

    println!(
        "Matched: {} / {} pages ({:.1}%)",
        stats.matched,
        stats.completed(),
        percentage(stats.matched, stats.completed())
    );
    println!();
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
