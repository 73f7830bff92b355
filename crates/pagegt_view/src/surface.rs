//! The overlay surface capability interface and a retained implementation.

use crate::{Bounds, Overlay, OverlayLayer};

/// Where the overlay is pinned relative to the page image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayAnchor {
    /// Image size in pixels; the overlay's coordinate system is `0 0 w h`
    pub image_width: f64,
    pub image_height: f64,
    /// Screen rectangle covered by the image when anchored
    pub screen: Bounds,
}

/// Everything the editor needs from whatever draws the overlay.
///
/// Every method is required; hosts that cannot honor one (e.g. interactivity
/// on a static export) implement it as a no-op.
pub trait OverlaySurface {
    /// Pin the overlay to the image (on image load and surface resize).
    fn anchor(&mut self, anchor: OverlayAnchor);

    /// Replace the displayed overlay with a freshly rendered frame.
    fn present(&mut self, overlay: Overlay);

    /// Enable or disable pointer interaction on existing shapes.
    fn set_shapes_interactive(&mut self, interactive: bool);

    /// Show or hide the region and line groups.
    fn set_layer_visibility(&mut self, regions: bool, lines: bool);
}

/// An overlay surface that simply keeps the last frame and settings.
///
/// Used by the headless binary (for SVG export) and by tests.
#[derive(Debug, Clone)]
pub struct RetainedOverlay {
    overlay: Overlay,
    anchor: Option<OverlayAnchor>,
    interactive: bool,
    show_regions: bool,
    show_lines: bool,
    frames: usize,
    anchors: usize,
}

impl Default for RetainedOverlay {
    fn default() -> Self {
        Self {
            overlay: Overlay::new(),
            anchor: None,
            interactive: true,
            show_regions: true,
            show_lines: true,
            frames: 0,
            anchors: 0,
        }
    }
}

impl RetainedOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn anchor_bounds(&self) -> Option<OverlayAnchor> {
        self.anchor
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn is_visible(&self, layer: OverlayLayer) -> bool {
        match layer {
            OverlayLayer::Regions => self.show_regions,
            OverlayLayer::Lines => self.show_lines,
            OverlayLayer::Editing => true,
        }
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> usize {
        self.frames
    }

    /// Number of times the overlay was re-anchored.
    pub fn anchor_count(&self) -> usize {
        self.anchors
    }

    /// Export the visible overlay as an SVG document.
    pub fn to_svg(&self) -> Option<String> {
        let anchor = self.anchor?;
        Some(crate::to_svg(
            &self.overlay,
            anchor.image_width,
            anchor.image_height,
            |layer| self.is_visible(layer),
        ))
    }
}

impl OverlaySurface for RetainedOverlay {
    fn anchor(&mut self, anchor: OverlayAnchor) {
        log::debug!(
            "Overlay anchored: {}x{} image at ({:.1}, {:.1})",
            anchor.image_width,
            anchor.image_height,
            anchor.screen.x,
            anchor.screen.y
        );
        self.anchor = Some(anchor);
        self.anchors += 1;
    }

    fn present(&mut self, overlay: Overlay) {
        self.overlay = overlay;
        self.frames += 1;
    }

    fn set_shapes_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    fn set_layer_visibility(&mut self, regions: bool, lines: bool) {
        self.show_regions = regions;
        self.show_lines = lines;
    }
}
