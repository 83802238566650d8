//! CLI output formatting.
//!
//! Every candidate is shown by its 1-based position in the source list and
//! its image ref; the media query and breakpoint follow as indented context.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Candidates
//! 001 hero-small.jpg
//!     Media: (min-width: 0px)
//!     Breakpoint: 0
//! 002 hero-large.avif
//!     Media: (min-width: 768px)
//!     Breakpoint: 768
//!     Type: image/avif
//! ```
//!
//! ## Select
//!
//! ```text
//! Viewport 1024x768
//!     001 hero-small.jpg (hidden)
//!     002 hero-large.avif ← shown
//! Background: url("hero-large.avif")
//! ```
//!
//! ## Sweep
//!
//! ```text
//! 0px → 001 hero-small.jpg
//! 768px → 002 hero-large.avif
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout.

use crate::select::Selection;
use crate::source::CandidateList;
use crate::surface::css_url;
use crate::viewport::Viewport;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn candidate_label(candidates: &CandidateList, index: usize) -> String {
    let image = candidates.get(index).map(|c| c.image_ref()).unwrap_or("?");
    format!("{} {}", format_index(index + 1), image)
}

// ============================================================================
// Check
// ============================================================================

pub fn format_candidates(candidates: &CandidateList) -> Vec<String> {
    if candidates.is_empty() {
        return vec!["No usable sources".to_string()];
    }
    let mut lines = vec!["Candidates".to_string()];
    for (index, c) in candidates.iter().enumerate() {
        lines.push(candidate_label(candidates, index));
        lines.push(format!("{}Media: {}", indent(1), c.media_query()));
        match c.breakpoint() {
            Some(bp) => lines.push(format!("{}Breakpoint: {}", indent(1), bp)),
            None => lines.push(format!("{}Breakpoint: none (never selected)", indent(1))),
        }
        if let Some(t) = c.type_hint() {
            lines.push(format!("{}Type: {}", indent(1), t));
        }
    }
    lines
}

pub fn print_candidates(candidates: &CandidateList) {
    for line in format_candidates(candidates) {
        println!("{}", line);
    }
}

// ============================================================================
// Select
// ============================================================================

pub fn format_selection(
    candidates: &CandidateList,
    selection: &Selection,
    viewport: &Viewport,
) -> Vec<String> {
    let mut lines = vec![format!("Viewport {}x{}", viewport.width, viewport.height)];
    for index in 0..candidates.len() {
        let state = if selection.is_displayed(index) {
            " ← shown"
        } else {
            " (hidden)"
        };
        lines.push(format!(
            "{}{}{}",
            indent(1),
            candidate_label(candidates, index),
            state
        ));
    }
    match selection.image_ref(candidates) {
        Some(image) => lines.push(format!("Background: {}", css_url(image))),
        None => lines.push("Background: none (no source matches)".to_string()),
    }
    lines
}

pub fn print_selection(candidates: &CandidateList, selection: &Selection, viewport: &Viewport) {
    for line in format_selection(candidates, selection, viewport) {
        println!("{}", line);
    }
}

// ============================================================================
// Sweep
// ============================================================================

/// One line per width at which the selection changes.
///
/// `rows` are `(width, selection)` pairs in ascending width order.
pub fn format_sweep(candidates: &CandidateList, rows: &[(u32, Selection)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<Option<usize>> = None;
    for (width, selection) in rows {
        if previous == Some(selection.index()) {
            continue;
        }
        previous = Some(selection.index());
        let target = match selection.index() {
            Some(index) => candidate_label(candidates, index),
            None => "none".to_string(),
        };
        lines.push(format!("{}px → {}", width, target));
    }
    lines
}

pub fn print_sweep(candidates: &CandidateList, rows: &[(u32, Selection)]) {
    for line in format_sweep(candidates, rows) {
        println!("{}", line);
    }
}
