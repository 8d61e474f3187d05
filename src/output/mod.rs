//! Output module for crawl reports and match lists
//!
//! This module handles:
//! - Printing the statistics of each finished crawl
//! - Writing the recorded matches as markdown

mod markdown;
pub mod stats;

pub use markdown::{format_hits, write_hits};
pub use stats::print_report;
