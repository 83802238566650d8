//! The rendering side of a selection.
//!
//! The selector decides which background layer is visible; a
//! [`BackgroundSurface`] is whatever actually shows it. In a browser host that
//! is one absolutely positioned element per candidate. [`RecordingSurface`]
//! keeps the same state in memory and logs every write, which is what the CLI
//! and the tests use.

/// Receives per-layer visibility and images, one layer per candidate index.
pub trait BackgroundSurface {
    /// Show or hide the layer at `index`.
    fn set_displayed(&mut self, index: usize, displayed: bool);

    /// Set the layer's background image. `image` is a CSS `url(...)` value.
    fn set_image(&mut self, index: usize, image: &str);
}

/// Format an image ref as a quoted CSS `url("...")` value.
///
/// `"` and `\` are backslash-escaped; newlines become the `\a ` escape.
pub fn css_url(image_ref: &str) -> String {
    let mut out = String::with_capacity(image_ref.len() + 7);
    out.push_str("url(\"");
    for c in image_ref.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push_str("\")");
    out
}

/// State of one layer on a [`RecordingSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerState {
    pub displayed: bool,
    pub image: Option<String>,
}

/// A write made to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceWrite {
    Displayed { index: usize, displayed: bool },
    Image { index: usize, image: String },
}

/// In-memory surface. Layers are created on first write.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    layers: Vec<LayerState>,
    writes: Vec<SurfaceWrite>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerState> {
        self.layers.get(index)
    }

    /// All writes so far, oldest first.
    pub fn writes(&self) -> &[SurfaceWrite] {
        &self.writes
    }

    /// Return and clear the write log. Layer state is kept.
    pub fn take_writes(&mut self) -> Vec<SurfaceWrite> {
        std::mem::take(&mut self.writes)
    }

    /// Index of the visible layer, if exactly one is visible.
    pub fn visible_layer(&self) -> Option<usize> {
        let mut visible = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.displayed)
            .map(|(i, _)| i);
        match (visible.next(), visible.next()) {
            (Some(i), None) => Some(i),
            _ => None,
        }
    }

    fn layer_mut(&mut self, index: usize) -> &mut LayerState {
        if index >= self.layers.len() {
            self.layers.resize_with(index + 1, LayerState::default);
        }
        &mut self.layers[index]
    }
}

impl BackgroundSurface for RecordingSurface {
    fn set_displayed(&mut self, index: usize, displayed: bool) {
        self.layer_mut(index).displayed = displayed;
        self.writes.push(SurfaceWrite::Displayed { index, displayed });
    }

    fn set_image(&mut self, index: usize, image: &str) {
        self.layer_mut(index).image = Some(image.to_string());
        self.writes.push(SurfaceWrite::Image {
            index,
            image: image.to_string(),
        });
    }
}
