//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: they do no I/O.
//!
//! ## Make
//!
//! ```text
//! generated  photos/cat.png → thumbnails/photos/cat_200x100_fit_80.png
//! cached     a.jpg → thumbnails/a_200x100_fit_80.jpg
//! failed     gone.jpg: Source image not found: public/images/gone.jpg
//!
//! Cache: 1 cached, 1 generated, 1 failed
//! ```
//!
//! ## List
//!
//! ```text
//! photos/cat_200x100_fit_80.png   200x100  fit     q80
//! notes.txt                        (not a thumbnail)
//! ```

use crate::cache::{CacheOutcome, CacheStats, ListedThumb};
use crate::generate::BatchItem;

fn outcome_label(outcome: CacheOutcome) -> &'static str {
    match outcome {
        CacheOutcome::Hit => "cached",
        CacheOutcome::Generated => "generated",
    }
}

fn dimension(d: Option<u32>) -> String {
    d.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

// ============================================================================
// Make
// ============================================================================

/// Format the results of a `make` run, one line per input plus a summary.
pub fn format_make_output(items: &[BatchItem]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stats = CacheStats::default();
    let mut failed = 0;

    for item in items {
        match &item.result {
            Ok(thumb) => {
                stats.record(thumb.outcome);
                lines.push(format!(
                    "{:<10} {} → {}",
                    outcome_label(thumb.outcome),
                    item.input,
                    thumb.path
                ));
            }
            Err(e) => {
                failed += 1;
                lines.push(format!("{:<10} {}: {}", "failed", item.input, e));
            }
        }
    }

    lines.push(String::new());
    if failed > 0 {
        lines.push(format!("Cache: {}, {} failed", stats, failed));
    } else {
        lines.push(format!("Cache: {}", stats));
    }
    lines
}

pub fn print_make_output(items: &[BatchItem]) {
    for line in format_make_output(items) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// Format a thumbnail listing as aligned columns.
pub fn format_list_output(thumbs: &[ListedThumb]) -> Vec<String> {
    if thumbs.is_empty() {
        return vec!["No thumbnails".to_string()];
    }
    let width = thumbs.iter().map(|t| t.path.chars().count()).max().unwrap_or(0);

    thumbs
        .iter()
        .map(|t| match (&t.mode, t.quality) {
            (Some(mode), Some(quality)) => format!(
                "{:<width$}  {:>9}  {:<6}  q{}",
                t.path,
                format!("{}x{}", dimension(t.width), dimension(t.height)),
                mode,
                quality,
            ),
            _ => format!("{:<width$}  (not a thumbnail)", t.path),
        })
        .collect()
}

pub fn print_list_output(thumbs: &[ListedThumb]) {
    for line in format_list_output(thumbs) {
        println!("{}", line);
    }
}
