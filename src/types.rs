//! Input types read from source files.
//!
//! A source file describes the `<source>` children of one `<picture>` element
//! in document order. The host layer (or the CLI) reads it and hands the
//! attributes to [`crate::source`] to build a candidate list.

use serde::{Deserialize, Serialize};

/// Attributes of one `<source>` element.
///
/// Field names follow the HTML attributes. `data-srcset` is the attribute
/// lazy-loading libraries use before swapping it into `srcset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceAttrs {
    /// The `media` attribute, e.g. `(min-width: 768px)`
    #[serde(default)]
    pub media: Option<String>,
    /// The `type` attribute, e.g. `image/avif`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
    #[serde(
        default,
        rename = "data-srcset",
        alias = "data_srcset",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_srcset: Option<String>,
}

impl SourceAttrs {
    /// Shorthand for a source with `media` and `srcset` set.
    pub fn new(media: &str, srcset: &str) -> Self {
        Self {
            media: Some(media.to_string()),
            srcset: Some(srcset.to_string()),
            ..Self::default()
        }
    }
}

/// Contents of a source file: the sources of one picture, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PictureSources {
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceAttrs>,
}
