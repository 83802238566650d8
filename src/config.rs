//! Configuration module.
//!
//! Handles loading, validating, and merging `picture-bg.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [background]
//! size = "cover"            # background-size of every layer
//! position = "center"       # background-position
//! repeat = "no-repeat"      # background-repeat
//!
//! [background.extra]        # Any other CSS property
//! # attachment = "fixed"    # → background-attachment: fixed
//! # "background-color" = "#222"
//!
//! [resize]
//! quiescence_ms = 250       # Debounce window for viewport changes
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Class of the element holding one background layer per source.
pub const LAYER_CONTAINER_CLASS: &str = "fluid-picture-backgrounds";

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "picture-bg.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `picture-bg.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// CSS applied to every background layer.
    pub background: BackgroundProps,
    /// Viewport change handling.
    pub resize: ResizeConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize.quiescence_ms == 0 {
            return Err(ConfigError::Validation(
                "resize.quiescence_ms must be greater than 0".into(),
            ));
        }
        for (key, value) in [
            ("background.size", &self.background.size),
            ("background.position", &self.background.position),
            ("background.repeat", &self.background.repeat),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if let Some(name) = self
            .background
            .extra
            .keys()
            .find(|name| !is_css_ident(name))
        {
            return Err(ConfigError::Validation(format!(
                "background.extra: '{name}' is not a CSS property name"
            )));
        }
        for (key, value) in [
            ("background.size", &self.background.size),
            ("background.position", &self.background.position),
            ("background.repeat", &self.background.repeat),
        ]
        .into_iter()
        .chain(self.background.extra.values().map(|v| ("background.extra", v)))
        {
            if !is_safe_value(value) {
                return Err(ConfigError::Validation(format!(
                    "{key}: value '{value}' must not contain ';', '{{' or '}}'"
                )));
            }
        }
        Ok(())
    }
}

/// Debounce settings for viewport changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Quiet period after the last change before re-selecting, in milliseconds.
    pub quiescence_ms: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self { quiescence_ms: 250 }
    }
}

impl ResizeConfig {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Background properties shared by all layers.
///
/// `size`, `position` and `repeat` are the ones that make a layer behave like
/// a cropped `<img>`. `extra` holds any further properties. Keys that do not
/// start with `background-` and are not custom properties get the prefix
/// added, so `attachment` means `background-attachment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundProps {
    pub size: String,
    pub position: String,
    pub repeat: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Default for BackgroundProps {
    fn default() -> Self {
        Self {
            size: "cover".to_string(),
            position: "center".to_string(),
            repeat: "no-repeat".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl BackgroundProps {
    /// Merge caller-supplied properties over these.
    ///
    /// Names may be CSS (`background-size`), short (`size`) or style-object
    /// camelCase (`backgroundSize`). `size`, `position` and `repeat` replace
    /// the core values; everything else lands in `extra` under its kebab-case
    /// name. Empty values are ignored. Names that are not CSS identifiers and
    /// values that could close a declaration (`;`, `{`, `}`) are dropped with
    /// a warning.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in overrides {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let name = kebab_case(name.trim());
            if !is_css_ident(&name) {
                warn!(name = %name, "ignoring background property with invalid name");
                continue;
            }
            if !is_safe_value(value) {
                warn!(name = %name, value, "ignoring background property with unsafe value");
                continue;
            }
            match name.strip_prefix("background-").unwrap_or(&name) {
                "size" => self.size = value.to_string(),
                "position" => self.position = value.to_string(),
                "repeat" => self.repeat = value.to_string(),
                _ => {
                    self.extra.insert(name, value.to_string());
                }
            }
        }
        self
    }

    /// All properties as `(css-name, value)` pairs, core properties first.
    ///
    /// Extra entries with an invalid name or value are left out.
    pub fn declarations(&self) -> Vec<(String, String)> {
        let mut decls = vec![
            ("background-size".to_string(), self.size.clone()),
            ("background-position".to_string(), self.position.clone()),
            ("background-repeat".to_string(), self.repeat.clone()),
        ];
        for (name, value) in &self.extra {
            if value.trim().is_empty() || !is_css_ident(name) || !is_safe_value(value) {
                continue;
            }
            decls.push((css_property_name(name), value.clone()));
        }
        decls
    }
}

/// `backgroundSize` → `background-size`. Custom properties are kept as-is.
fn kebab_case(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn is_safe_value(value: &str) -> bool {
    !value.contains([';', '{', '}'])
}

fn css_property_name(name: &str) -> String {
    if name.starts_with("background-") || name.starts_with("--") {
        name.to_string()
    } else if BACKGROUND_LONGHANDS.contains(&name) {
        format!("background-{name}")
    } else {
        name.to_string()
    }
}

/// `background-*` longhands that may be written without their prefix.
const BACKGROUND_LONGHANDS: &[&str] = &[
    "attachment",
    "blend-mode",
    "clip",
    "color",
    "image",
    "origin",
    "position-x",
    "position-y",
];

fn is_css_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `picture-bg.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `picture-bg.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `picture-bg.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# picture-bg Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Background layers
# ---------------------------------------------------------------------------
[background]
# How each layer's image fills the picture box.
# "cover" crops to fill; "contain" letterboxes.
size = "cover"

# Focal point kept in view when cropping.
position = "center"

repeat = "no-repeat"

# Further CSS properties for every layer. Short background longhands get
# the "background-" prefix: attachment = "fixed" → background-attachment.
[background.extra]
# attachment = "fixed"

# ---------------------------------------------------------------------------
# Viewport changes
# ---------------------------------------------------------------------------
[resize]
# Quiet period after the last resize before the image is re-selected (ms).
quiescence_ms = 250
"##
}

/// Render background properties as CSS declarations for a layer rule.
pub fn generate_background_css(props: &BackgroundProps) -> String {
    props
        .declarations()
        .iter()
        .map(|(name, value)| format!("    {name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full stylesheet for pictures rendered as background layers.
///
/// The picture becomes the positioning box and its `<img>` stays in the
/// layout but invisible. The layer container and every layer are centred
/// over it at full size, and each layer carries the background properties.
pub fn generate_layer_css(props: &BackgroundProps) -> String {
    let container = format!(".{LAYER_CONTAINER_CLASS}");
    format!(
        r#"picture:has(> {container}) {{
    position: relative;
}}

picture:has(> {container}) > img {{
    opacity: 0;
}}

{container},
{container} > div {{
    position: absolute;
    width: 100%;
    height: 100%;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
}}

{container} > div {{
{background}
}}
"#,
        background = generate_background_css(props)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_cover_center_no_repeat() {
        let c = Config::default();
        assert_eq!(c.background.size, "cover");
        assert_eq!(c.background.position, "center");
        assert_eq!(c.background.repeat, "no-repeat");
        assert_eq!(c.resize.quiescence(), Duration::from_millis(250));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_quiescence() {
        let mut c = Config::default();
        c.resize.quiescence_ms = 0;
        assert!(matches!(c.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_core_property() {
        let mut c = Config::default();
        c.background.position = "  ".into();
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("background.position"));
    }

    #[test]
    fn validate_bad_extra_name() {
        let mut c = Config::default();
        c.background.extra.insert("color; top".into(), "red".into());
        assert!(matches!(c.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_nested_table_preserves_siblings() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[background]\nposition = \"top\"").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["background"]["position"].as_str(), Some("top"));
        assert_eq!(merged["background"]["size"].as_str(), Some("cover"));
        assert_eq!(merged["resize"]["quiescence_ms"].as_integer(), Some(250));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[background]\nsise = \"cover\"").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let overlay: toml::Value = toml::from_str("[layout]\nx = 1").unwrap();
        assert!(resolve_config(stock_defaults_value(), Some(overlay)).is_err());
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let c = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[resize]\nquiescence_ms = 0").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn load_config_applies_overrides() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[background]
size = "contain"

[background.extra]
attachment = "fixed"

[resize]
quiescence_ms = 100
"#,
        )
        .unwrap();
        let c = load_config(tmp.path()).unwrap();
        assert_eq!(c.background.size, "contain");
        assert_eq!(c.background.position, "center");
        assert_eq!(c.background.extra["attachment"], "fixed");
        assert_eq!(c.resize.quiescence_ms, 100);
    }

    #[test]
    fn load_raw_config_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[background\n").unwrap();
        assert!(matches!(
            load_raw_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let c = resolve_config(stock_defaults_value(), Some(value)).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn overrides_replace_core_properties() {
        let props = BackgroundProps::default()
            .with_overrides([("background-position", "top left"), ("size", "contain")]);
        assert_eq!(props.position, "top left");
        assert_eq!(props.size, "contain");
        assert_eq!(props.repeat, "no-repeat");
    }

    #[test]
    fn overrides_skip_empty_values() {
        let props = BackgroundProps::default().with_overrides([("size", ""), ("color", " ")]);
        assert_eq!(props, BackgroundProps::default());
    }

    #[test]
    fn overrides_add_extra_properties() {
        let props = BackgroundProps::default().with_overrides([("attachment", "fixed")]);
        assert_eq!(props.extra.get("attachment").map(String::as_str), Some("fixed"));
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let props = BackgroundProps::default().with_overrides(std::iter::empty());
        assert_eq!(props, BackgroundProps::default());
    }

    #[test]
    fn declarations_prefix_short_longhands() {
        let props = BackgroundProps::default().with_overrides([
            ("attachment", "fixed"),
            ("--focus", "50% 20%"),
            ("filter", "grayscale(1)"),
        ]);
        let decls = props.declarations();
        let names: Vec<&str> = decls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "background-size",
                "background-position",
                "background-repeat",
                "--focus",
                "background-attachment",
                "filter",
            ]
        );
    }

    #[test]
    fn overrides_accept_style_object_names() {
        let props = BackgroundProps::default().with_overrides([
            ("backgroundSize", "contain"),
            ("backgroundPosition", "50% 20%"),
            ("backgroundAttachment", "fixed"),
        ]);
        assert_eq!(props.size, "contain");
        assert_eq!(props.position, "50% 20%");
        assert_eq!(
            props.extra.get("background-attachment").map(String::as_str),
            Some("fixed")
        );
        let css = generate_background_css(&props);
        assert!(css.contains("background-size: contain;"));
        assert!(!css.contains("backgroundSize"));
    }

    #[test]
    fn overrides_drop_invalid_names_and_values() {
        let props = BackgroundProps::default().with_overrides([
            ("color; top", "0"),
            ("9lives", "x"),
            ("color", "red; display: none"),
            ("size", "contain }"),
        ]);
        assert_eq!(props, BackgroundProps::default());
        let css = generate_background_css(&props);
        assert!(!css.contains("top"));
        assert!(!css.contains("display"));
    }

    #[test]
    fn declarations_skip_invalid_extra_entries() {
        let mut props = BackgroundProps::default();
        props.extra.insert("color; top".into(), "0".into());
        props.extra.insert("color".into(), "red; x: y".into());
        assert_eq!(props.declarations().len(), 3);
    }

    #[test]
    fn validate_unsafe_value() {
        let mut c = Config::default();
        c.background.size = "cover; color: red".into();
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("background.size"));
    }

    #[test]
    fn layer_css_full_stylesheet() {
        let css = generate_layer_css(&BackgroundProps::default());
        assert_eq!(
            css,
            r#"picture:has(> .fluid-picture-backgrounds) {
    position: relative;
}

picture:has(> .fluid-picture-backgrounds) > img {
    opacity: 0;
}

.fluid-picture-backgrounds,
.fluid-picture-backgrounds > div {
    position: absolute;
    width: 100%;
    height: 100%;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
}

.fluid-picture-backgrounds > div {
    background-size: cover;
    background-position: center;
    background-repeat: no-repeat;
}
"#
        );
    }

    #[test]
    fn layer_css_includes_extra_properties() {
        let props = BackgroundProps::default().with_overrides([("attachment", "fixed")]);
        let css = generate_layer_css(&props);
        assert!(css.contains("    background-repeat: no-repeat;\n    background-attachment: fixed;\n}"));
    }

    #[test]
    fn background_css_renders_declarations() {
        let css = generate_background_css(&BackgroundProps::default());
        assert_eq!(
            css,
            "    background-size: cover;\n    background-position: center;\n    background-repeat: no-repeat;"
        );
    }
}
