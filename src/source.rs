//! Candidate construction from `<source>` attributes.
//!
//! Each `<source>` of a picture becomes one [`BackgroundCandidate`]: its media
//! query, the numeric breakpoint found in that query, and the base image of its
//! srcset.
//!
//! ## Breakpoints
//!
//! The breakpoint is the first run of ASCII digits in the media query:
//! - `(min-width: 768px)` → `768`
//! - `(min-width: 30em) and (max-width: 60em)` → `30`
//! - `(orientation: portrait)` → none
//!
//! A query without digits, or whose first digit run does not fit a `u32`, has
//! no breakpoint. Such candidates never win a selection.
//!
//! ## Image refs
//!
//! Only the first srcset entry is used, with its descriptor dropped:
//! `hero-800.avif 800w, hero-1600.avif 1600w` → `hero-800.avif`. Entries are
//! separated by whitespace plus a comma, so a `data:` URI keeps its commas.

use crate::types::{PictureSources, SourceAttrs};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source {index}: missing media attribute")]
    MissingMedia { index: usize },
    #[error("source {index}: missing srcset (and data-srcset)")]
    MissingSrcset { index: usize },
    #[error("source {index}: srcset has no image URL")]
    EmptySrcset { index: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One responsive source, ready for breakpoint selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundCandidate {
    media_query: String,
    breakpoint: Option<u32>,
    image_ref: String,
    type_hint: Option<String>,
}

impl BackgroundCandidate {
    /// Build a candidate directly. The breakpoint is parsed from `media_query`.
    pub fn new(media_query: &str, image_ref: &str) -> Self {
        Self {
            media_query: media_query.to_string(),
            breakpoint: parse_breakpoint(media_query),
            image_ref: image_ref.to_string(),
            type_hint: None,
        }
    }

    /// Build a candidate from the attributes of the `index`-th `<source>`.
    pub fn from_source(index: usize, attrs: &SourceAttrs) -> Result<Self, SourceError> {
        let media = attrs
            .media
            .as_deref()
            .ok_or(SourceError::MissingMedia { index })?;
        let srcset = attrs
            .srcset
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(attrs.data_srcset.as_deref())
            .ok_or(SourceError::MissingSrcset { index })?;
        let image_ref = first_srcset_url(srcset).ok_or(SourceError::EmptySrcset { index })?;

        let breakpoint = parse_breakpoint(media);
        if breakpoint.is_none() {
            warn!(index, media, "media query has no numeric breakpoint");
        }

        Ok(Self {
            media_query: media.to_string(),
            breakpoint,
            image_ref: image_ref.to_string(),
            type_hint: attrs.type_hint.clone(),
        })
    }

    pub fn media_query(&self) -> &str {
        &self.media_query
    }

    pub fn breakpoint(&self) -> Option<u32> {
        self.breakpoint
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn type_hint(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }
}

/// Candidates in source order. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    candidates: Vec<BackgroundCandidate>,
}

impl CandidateList {
    pub fn new(candidates: Vec<BackgroundCandidate>) -> Self {
        Self { candidates }
    }

    /// Build from source attributes, skipping (and logging) invalid sources.
    pub fn from_sources(sources: &[SourceAttrs]) -> Self {
        let candidates = sources
            .iter()
            .enumerate()
            .filter_map(
                |(index, attrs)| match BackgroundCandidate::from_source(index, attrs) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        warn!("skipping source: {e}");
                        None
                    }
                },
            )
            .collect();
        Self { candidates }
    }

    /// Build from source attributes, failing on the first invalid source.
    pub fn try_from_sources(sources: &[SourceAttrs]) -> Result<Self, SourceError> {
        let candidates = sources
            .iter()
            .enumerate()
            .map(|(index, attrs)| BackgroundCandidate::from_source(index, attrs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BackgroundCandidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BackgroundCandidate> {
        self.candidates.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a BackgroundCandidate;
    type IntoIter = std::slice::Iter<'a, BackgroundCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Extract the first contiguous digit run of a media query as a number.
pub fn parse_breakpoint(media: &str) -> Option<u32> {
    let start = media.find(|c: char| c.is_ascii_digit())?;
    let digits = &media[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// The URL of the first entry of a srcset, without its descriptor.
///
/// Follows the srcset grammar: leading whitespace and commas are skipped, the
/// URL runs to the next whitespace, and trailing commas are not part of it.
/// Commas inside a URL (`data:` URIs) are kept.
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    let rest = srcset.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
    let end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
    let url = rest[..end].trim_end_matches(',');
    (!url.is_empty()).then_some(url)
}

/// Load a source file. `.json` files are read as JSON, anything else as TOML.
pub fn load_sources(path: &Path) -> Result<PictureSources, SourceError> {
    let content = fs::read_to_string(path)?;
    let sources = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };
    Ok(sources)
}
