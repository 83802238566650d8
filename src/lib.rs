//! # picture-bg
//!
//! Render the sources of a responsive `<picture>` as CSS background layers.
//!
//! `<img>` cannot crop to fill its box the way `background-size: cover` can.
//! This crate takes the `<source>` list of a picture, turns each source into a
//! background layer, and decides which layer is visible for the current
//! viewport. It re-decides whenever the viewport changes, after a debounce.
//!
//! # Flow
//!
//! ```text
//! <source> attrs ──► CandidateList ──► select(viewport) ──► Selection
//!   (types)            (source)          (select)              │
//!                                                              ▼
//! resize signals ──► DebouncedTrigger ──► Selector::refresh ──► BackgroundSurface
//!                      (debounce)           (select)             (surface)
//! ```
//!
//! The crate never touches a DOM. The viewport is injected as a
//! [`viewport::MediaMatcher`] and results go to a [`surface::BackgroundSurface`],
//! so the whole flow runs and tests without a browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Serialized `<source>` attributes and source files |
//! | [`source`] | Builds candidates: breakpoint and base-image extraction |
//! | [`select`] | Highest-matching-breakpoint selection, write-minimal application |
//! | [`surface`] | Where selections are rendered; in-memory recording surface |
//! | [`viewport`] | Media query matching, simulated viewports |
//! | [`debounce`] | Quiescence-window coalescing of viewport changes |
//! | [`config`] | `picture-bg.toml` loading, validation, and background CSS |
//! | [`output`] | CLI output formatting |
//!
//! # Selection Rule
//!
//! Among the sources whose media query matches, the one with the highest
//! breakpoint wins. With mobile-first `min-width` queries that is the widest
//! range that still fits. Ties go to the earliest source. No match means no
//! layer is shown, and sources whose query has no number never win.

pub mod config;
pub mod debounce;
pub mod output;
pub mod select;
pub mod source;
pub mod surface;
pub mod types;
pub mod viewport;

pub use select::{Selection, Selector, select};
pub use source::{BackgroundCandidate, CandidateList};

#[cfg(test)]
pub(crate) mod test_helpers;
