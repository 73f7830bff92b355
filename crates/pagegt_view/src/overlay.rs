//! Overlay shapes for rendering on top of the page image.
//!
//! This module provides simple shape types that can be drawn as overlays.
//! These are decoupled from the editor's region/line types: the editor builds
//! an [`Overlay`] and hands it to an [`crate::OverlaySurface`].

use crate::Point;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form, as used by SVG attributes.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Stroke and fill styling for an overlay item.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Fill color, `None` for unfilled shapes
    pub fill: Option<Color>,
    /// Fill opacity in 0..=1
    pub fill_opacity: f64,
    /// Stroke color
    pub color: Color,
    /// Stroke opacity in 0..=1
    pub opacity: f64,
    /// Stroke width in image pixels
    pub width: f64,
    /// SVG dash pattern, e.g. `"4 3"`
    pub dash: Option<&'static str>,
}

/// A shape that can be drawn as an overlay (image coordinates).
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// A closed polygon.
    Polygon {
        /// Vertices in image space
        vertices: Vec<Point>,
    },
    /// An open polyline.
    Polyline {
        /// Vertices in image space
        vertices: Vec<Point>,
    },
    /// A draggable vertex handle.
    Handle {
        /// Center in image space
        center: Point,
        /// Radius in image space (already divided by the view scale)
        radius: f64,
    },
}

/// Which group an item is drawn in. Groups are toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayLayer {
    Regions,
    Lines,
    /// In-progress drawing and point handles; never hidden
    Editing,
}

/// An overlay item with shape, styling and hover metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    /// The shape to draw
    pub shape: OverlayShape,
    /// Styling
    pub stroke: Stroke,
    /// Group the item belongs to
    pub layer: OverlayLayer,
    /// CSS-like class name (`region`, `line`, `base`, `handle`, `draft`)
    pub class: &'static str,
    /// Hover text
    pub title: Option<String>,
    /// Opaque key the host can use to route pointer events back to a shape
    pub key: Option<String>,
    /// Whether this item belongs to the current selection
    pub selected: bool,
}

impl OverlayItem {
    /// Create a new overlay item.
    pub fn new(shape: OverlayShape, stroke: Stroke, layer: OverlayLayer, class: &'static str) -> Self {
        Self {
            shape,
            stroke,
            layer,
            class,
            title: None,
            key: None,
            selected: false,
        }
    }

    /// Attach hover text.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach a routing key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Mark this item as selected.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// A full overlay frame, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Items to render
    pub items: Vec<OverlayItem>,
}

impl Overlay {
    /// Create a new empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the overlay.
    pub fn push(&mut self, item: OverlayItem) {
        self.items.push(item);
    }

    /// Check if the overlay is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items with the given class.
    pub fn items_of_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a OverlayItem> + 'a {
        self.items.iter().filter(move |item| item.class == class)
    }

    /// Items in the given layer.
    pub fn items_in(&self, layer: OverlayLayer) -> impl Iterator<Item = &OverlayItem> + '_ {
        self.items.iter().filter(move |item| item.layer == layer)
    }
}
