//! Breakpoint selection.
//!
//! Several media queries can match at once: with `min-width` sources a
//! 1440px viewport matches `(min-width: 0px)`, `(min-width: 768px)` and
//! `(min-width: 1200px)`. The most specific source is the one with the
//! highest breakpoint, so that is the one shown.
//!
//! ```text
//! candidates         matches?   breakpoint
//! (min-width: 0px)      yes          0
//! (min-width: 768px)    yes        768
//! (min-width: 1200px)   yes       1200   ← selected
//! (min-width: 1920px)   no        1920
//! ```
//!
//! Rules:
//! - nothing matches → nothing is shown
//! - equal highest breakpoints → the first in source order wins
//! - candidates without a breakpoint may match but never win
//!
//! [`select`] is the pure computation. [`Selector`] applies results to a
//! [`BackgroundSurface`] and skips writes that would not change anything.

use crate::source::{BackgroundCandidate, CandidateList};
use crate::surface::{BackgroundSurface, css_url};
use crate::viewport::MediaMatcher;
use tracing::debug;

/// Outcome of one selection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    selected: Option<usize>,
    len: usize,
}

impl Selection {
    /// Index of the displayed candidate, or `None` when nothing matched.
    pub fn index(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_none(&self) -> bool {
        self.selected.is_none()
    }

    pub fn is_displayed(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// One flag per candidate; at most one is `true`.
    pub fn displayed_flags(&self) -> Vec<bool> {
        (0..self.len).map(|i| self.is_displayed(i)).collect()
    }

    pub fn candidate<'a>(&self, candidates: &'a CandidateList) -> Option<&'a BackgroundCandidate> {
        self.selected.and_then(|i| candidates.get(i))
    }

    pub fn image_ref<'a>(&self, candidates: &'a CandidateList) -> Option<&'a str> {
        self.candidate(candidates).map(|c| c.image_ref())
    }
}

/// Pick the candidate to display for the viewport described by `matcher`.
///
/// Every candidate's query is evaluated exactly once.
pub fn select<M>(candidates: &CandidateList, matcher: &M) -> Selection
where
    M: MediaMatcher + ?Sized,
{
    let mut best: Option<(usize, u32)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if !matcher.matches(candidate.media_query()) {
            continue;
        }
        let Some(bp) = candidate.breakpoint() else {
            continue;
        };
        // Strictly greater keeps the first of equal breakpoints
        if best.is_none_or(|(_, best_bp)| bp > best_bp) {
            best = Some((index, bp));
        }
    }
    Selection {
        selected: best.map(|(index, _)| index),
        len: candidates.len(),
    }
}

/// Applies selections to a surface, writing only what changed.
///
/// Each layer remembers the image and visibility last written to it. A
/// refresh with an unchanged viewport writes nothing.
#[derive(Debug)]
pub struct Selector {
    candidates: CandidateList,
    applied_images: Vec<Option<String>>,
    applied_displayed: Vec<Option<bool>>,
}

impl Selector {
    pub fn new(candidates: CandidateList) -> Self {
        let len = candidates.len();
        Self {
            candidates,
            applied_images: vec![None; len],
            applied_displayed: vec![None; len],
        }
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Run a selection pass and apply it to `surface`.
    pub fn refresh<M, S>(&mut self, matcher: &M, surface: &mut S) -> Selection
    where
        M: MediaMatcher + ?Sized,
        S: BackgroundSurface + ?Sized,
    {
        let selection = select(&self.candidates, matcher);
        debug!(selected = ?selection.index(), "selection pass");

        for (index, candidate) in self.candidates.iter().enumerate() {
            let displayed = selection.is_displayed(index);
            if displayed {
                let image = css_url(candidate.image_ref());
                if self.applied_images[index].as_deref() != Some(image.as_str()) {
                    surface.set_image(index, &image);
                    self.applied_images[index] = Some(image);
                }
            }
            if self.applied_displayed[index] != Some(displayed) {
                surface.set_displayed(index, displayed);
                self.applied_displayed[index] = Some(displayed);
            }
        }
        selection
    }
}
