//! pagegt_view - viewing surface and vector overlay primitives
//!
//! This crate holds the host-agnostic half of the page editor: the pan/zoom
//! state of the image display, the transform between screen and image pixels,
//! input event types, and the overlay display list that a host draws on top
//! of the page image. It knows nothing about regions or lines.

mod constants;
mod event;
mod geom;
mod overlay;
mod state;
mod surface;
mod svg;

pub use constants::*;
pub use event::{InputEvent, KeyCode, MouseButton};
pub use geom::{Bounds, Point, ScreenPoint};
pub use overlay::{Color, Overlay, OverlayItem, OverlayLayer, OverlayShape, Stroke};
pub use state::{PanDragState, ViewTransform, ViewerState, ViewingSurface};
pub use surface::{OverlayAnchor, OverlaySurface, RetainedOverlay};
pub use svg::to_svg;
