//! Markdown hit list generation

use crate::matcher::Hit;
use crate::DriftError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the hits as a markdown list to `output_path`
///
/// # Arguments
///
/// * `hits` - Recorded hits, in the order the sink received them
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(DriftError)` - Failed to create or write the file
pub fn write_hits(hits: &[Hit], output_path: &Path) -> Result<(), DriftError> {
    let markdown = format_hits(hits);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats hits as markdown
pub fn format_hits(hits: &[Hit]) -> String {
    let mut md = String::new();

    md.push_str("# Driftnet Matches\n\n");
    md.push_str(&format!("- **Total Matches**: {}\n\n", hits.len()));

    if hits.is_empty() {
        md.push_str("No matching pages found.\n");
        return md;
    }

    md.push_str("| Found At | URL |\n");
    md.push_str("|----------|-----|\n");
    for hit in hits {
        md.push_str(&format!(
            "| {} | <{}> |\n",
            hit.found_at.format("%Y-%m-%d %H:%M:%S UTC"),
            hit.url
        ));
    }

    md
}
