//! Centralized constants for pagegt_view
//!
//! Zoom limits follow the page viewer the editor replaces: 1.2 per click,
//! 1.1 per wheel step, clamped to [0.01, 40].

/// Zoom factor applied by a zoom-in / zoom-out button press
pub const ZOOM_PER_CLICK: f64 = 1.2;

/// Zoom factor applied per wheel notch
pub const ZOOM_PER_SCROLL: f64 = 1.1;

/// Minimum zoom level (relative to fit-to-view)
pub const ZOOM_MIN: f64 = 0.01;

/// Maximum zoom level (relative to fit-to-view)
pub const ZOOM_MAX: f64 = 40.0;

/// Pan movements smaller than this (screen pixels) are dropped
pub const PAN_EPSILON: f64 = 1e-6;
