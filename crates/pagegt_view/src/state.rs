//! Pan/zoom state of the image viewing surface.

use crate::constants::{PAN_EPSILON, ZOOM_MAX, ZOOM_MIN, ZOOM_PER_CLICK, ZOOM_PER_SCROLL};
use crate::{Bounds, Point, ScreenPoint};

/// Anything that displays the page image and can report its live transform.
///
/// The coordinate mapper queries `transform` on every conversion, so an
/// implementation must return the transform as of *now*.
pub trait ViewingSurface {
    /// The current image-to-screen transform, or `None` if no image is loaded.
    fn transform(&self) -> Option<ViewTransform>;

    /// Lock or unlock pan/zoom gestures (held for the duration of shape drags).
    fn set_pan_lock(&mut self, locked: bool);

    /// Whether pan/zoom gestures are currently locked.
    fn is_pan_locked(&self) -> bool;
}

/// Snapshot of the mapping between image pixels and screen pixels.
///
/// `screen = origin + image * scale`. Viewport space normalizes the image
/// width to 1.0, so `viewport = image / image_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the image's top-left corner
    pub origin: ScreenPoint,
    /// Screen pixels per image pixel
    pub scale: f64,
    /// Image width in pixels
    pub image_width: f64,
    /// Image height in pixels
    pub image_height: f64,
}

impl ViewTransform {
    pub fn image_to_screen(&self, p: Point) -> ScreenPoint {
        ScreenPoint::new(
            self.origin.x + p.x * self.scale,
            self.origin.y + p.y * self.scale,
        )
    }

    pub fn screen_to_image(&self, s: ScreenPoint) -> Point {
        Point::new(
            (s.x - self.origin.x) / self.scale,
            (s.y - self.origin.y) / self.scale,
        )
    }

    pub fn image_to_viewport(&self, p: Point) -> Point {
        Point::new(p.x / self.image_width, p.y / self.image_width)
    }

    pub fn viewport_to_image(&self, v: Point) -> Point {
        Point::new(v.x * self.image_width, v.y * self.image_width)
    }

    /// Where the image currently sits on screen.
    pub fn image_bounds(&self) -> Bounds {
        Bounds::new(
            self.origin.x,
            self.origin.y,
            self.image_width * self.scale,
            self.image_height * self.scale,
        )
    }
}

/// Pan drag interaction state for the viewing surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanDragState {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging with last mouse position (screen space)
    Dragging { last_pos: ScreenPoint },
}

impl PanDragState {
    /// Check if currently dragging
    pub fn is_dragging(&self) -> bool {
        matches!(self, PanDragState::Dragging { .. })
    }

    /// Get the last drag position if dragging
    pub fn last_pos(&self) -> Option<ScreenPoint> {
        match self {
            PanDragState::Dragging { last_pos } => Some(*last_pos),
            PanDragState::Idle => None,
        }
    }

    /// Start dragging with the given position
    pub fn start_drag(&mut self, pos: ScreenPoint) {
        *self = PanDragState::Dragging { last_pos: pos };
    }

    /// Update last position during drag
    pub fn update_pos(&mut self, pos: ScreenPoint) {
        if let PanDragState::Dragging { last_pos } = self {
            *last_pos = pos;
        }
    }

    /// Stop dragging
    pub fn stop_drag(&mut self) {
        *self = PanDragState::Idle;
    }
}

/// State for the image viewing surface.
///
/// Zoom 1.0 fits the whole image into the view, centered. Pan is an offset in
/// screen pixels from that centered position.
#[derive(Debug, Clone)]
pub struct ViewerState {
    /// Screen rectangle of the viewer widget
    pub view: Bounds,
    /// Loaded image size, `None` until an image is opened
    pub image_size: Option<(u32, u32)>,
    /// Zoom level relative to fit-to-view
    pub zoom: f64,
    /// Pan offset in screen pixels
    pub pan: (f64, f64),
    /// Drag interaction state for panning
    pub drag: PanDragState,
    /// Set while a shape edit owns the pointer
    pan_locked: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            view: Bounds::default(),
            image_size: None,
            zoom: 1.0,
            pan: (0.0, 0.0),
            drag: PanDragState::default(),
            pan_locked: false,
        }
    }
}

impl ViewerState {
    /// Create new state with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state for a view rectangle
    pub fn with_view(mut self, view: Bounds) -> Self {
        self.view = view;
        self
    }

    /// Resize the viewer widget. Returns true if the size actually changed.
    pub fn set_view_bounds(&mut self, view: Bounds) -> bool {
        if self.view == view {
            return false;
        }
        log::debug!(
            "Viewer resized to {:.0}x{:.0} at ({:.0}, {:.0})",
            view.width,
            view.height,
            view.x,
            view.y
        );
        self.view = view;
        true
    }

    /// Show a new image and reset the view to fit it.
    pub fn open_image(&mut self, width: u32, height: u32) {
        self.image_size = Some((width, height));
        self.drag.stop_drag();
        self.pan_locked = false;
        self.fit();
    }

    /// Remove the image; conversions become unavailable.
    pub fn close_image(&mut self) {
        self.image_size = None;
        self.drag.stop_drag();
        self.pan_locked = false;
        self.fit();
    }

    /// Fit the whole image into view ("home").
    pub fn fit(&mut self) {
        self.zoom = 1.0;
        self.pan = (0.0, 0.0);
    }

    /// Pan by a screen-space delta. Ignored while locked.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if self.pan_locked {
            return;
        }
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    /// Zoom by `factor` keeping the image point under `cursor` fixed.
    /// Ignored while locked.
    pub fn zoom_at(&mut self, cursor: ScreenPoint, factor: f64) {
        if self.pan_locked {
            return;
        }
        let Some(before) = self.transform() else {
            return;
        };
        let anchor = before.screen_to_image(cursor);
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);

        if let Some(after) = self.transform() {
            let moved = after.image_to_screen(anchor);
            self.pan.0 += cursor.x - moved.x;
            self.pan.1 += cursor.y - moved.y;
        }
    }

    /// Zoom in one click step around the view center
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.view_center(), ZOOM_PER_CLICK);
    }

    /// Zoom out one click step around the view center
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.view_center(), 1.0 / ZOOM_PER_CLICK);
    }

    /// Apply a wheel scroll (positive delta zooms in).
    pub fn scroll(&mut self, cursor: ScreenPoint, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let factor = if delta > 0.0 {
            ZOOM_PER_SCROLL
        } else {
            1.0 / ZOOM_PER_SCROLL
        };
        self.zoom_at(cursor, factor);
    }

    /// Begin a pan gesture. Returns false if pan is locked.
    pub fn start_pan(&mut self, pos: ScreenPoint) -> bool {
        if self.pan_locked {
            return false;
        }
        self.drag.start_drag(pos);
        true
    }

    /// Continue a pan gesture. Returns true if the view moved.
    pub fn update_pan(&mut self, pos: ScreenPoint) -> bool {
        let Some(last) = self.drag.last_pos() else {
            return false;
        };
        let dx = pos.x - last.x;
        let dy = pos.y - last.y;
        if dx.abs() < PAN_EPSILON && dy.abs() < PAN_EPSILON {
            return false;
        }
        self.drag.update_pos(pos);
        self.pan_by(dx, dy);
        !self.pan_locked
    }

    /// End a pan gesture
    pub fn end_pan(&mut self) {
        self.drag.stop_drag();
    }

    fn view_center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.view.x + self.view.width / 2.0,
            self.view.y + self.view.height / 2.0,
        )
    }
}

impl ViewingSurface for ViewerState {
    fn transform(&self) -> Option<ViewTransform> {
        let (w, h) = self.image_size?;
        if w == 0 || h == 0 || self.view.is_empty() {
            return None;
        }
        let (w, h) = (f64::from(w), f64::from(h));
        let fit = (self.view.width / w).min(self.view.height / h);
        let scale = fit * self.zoom;

        Some(ViewTransform {
            origin: ScreenPoint::new(
                self.view.x + (self.view.width - w * scale) / 2.0 + self.pan.0,
                self.view.y + (self.view.height - h * scale) / 2.0 + self.pan.1,
            ),
            scale,
            image_width: w,
            image_height: h,
        })
    }

    fn set_pan_lock(&mut self, locked: bool) {
        if locked {
            self.drag.stop_drag();
        }
        self.pan_locked = locked;
    }

    fn is_pan_locked(&self) -> bool {
        self.pan_locked
    }
}
