//! Shared test utilities for the picture-bg test suite.
//!
//! Builders for candidate lists and matchers that stand in for a live
//! viewport.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let list = candidates(&[("(min-width: 0px)", "a.jpg"), ("(min-width: 768px)", "b.jpg")]);
//! let sel = select(&list, &matching(&["(min-width: 0px)"]));
//! assert_eq!(sel.image_ref(&list), Some("a.jpg"));
//! ```

use std::cell::RefCell;
use std::collections::HashSet;

use crate::source::{BackgroundCandidate, CandidateList};
use crate::viewport::MediaMatcher;

// =========================================================================
// Candidate builders
// =========================================================================

/// Build a candidate list from `(media query, image ref)` pairs.
pub fn candidates(pairs: &[(&str, &str)]) -> CandidateList {
    CandidateList::new(
        pairs
            .iter()
            .map(|(media, image)| BackgroundCandidate::new(media, image))
            .collect(),
    )
}

// =========================================================================
// Matchers
// =========================================================================

/// A viewport where exactly the listed queries match.
pub struct QuerySet(HashSet<String>);

impl MediaMatcher for QuerySet {
    fn matches(&self, query: &str) -> bool {
        self.0.contains(query)
    }
}

/// Matcher for which only `queries` match (exact string comparison).
pub fn matching(queries: &[&str]) -> QuerySet {
    QuerySet(queries.iter().map(|q| q.to_string()).collect())
}

/// Wraps a predicate and records every query it is asked about.
pub struct CountingMatcher<F> {
    inner: F,
    seen: RefCell<Vec<String>>,
}

impl<F> CountingMatcher<F>
where
    F: Fn(&str) -> bool,
{
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Queries evaluated so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl<F> MediaMatcher for CountingMatcher<F>
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, query: &str) -> bool {
        self.seen.borrow_mut().push(query.to_string());
        (self.inner)(query)
    }
}
