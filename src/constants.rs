//! Global constants for the page editor

/// Minimum number of vertices for a region polygon.
pub const MIN_REGION_POINTS: usize = 3;

/// Minimum number of vertices for a new line.
pub const MIN_LINE_POINTS: usize = 2;

/// Drag deltas whose components are both below this (image units) are ignored.
pub const DRAG_EPSILON: f64 = 1e-6;

/// Points closer than this are treated as the same draw click.
pub const DUPLICATE_POINT_EPSILON: f64 = 1e-6;

/// A press on empty canvas stays a click until the pointer moves farther
/// than this, in screen pixels.
pub const DEFAULT_CLICK_THRESHOLD_PX: f64 = 5.0;

/// Tolerance for hitting a line edge or baseline, in screen pixels.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 5.0;

/// Apparent radius of a vertex handle, in screen pixels.
pub const DEFAULT_HANDLE_RADIUS_PX: f64 = 5.0;

/// Margin around a line when synthesizing a region for it, in image pixels.
pub const DEFAULT_REGION_PADDING: f64 = 50.0;

/// Default timeout for persistence requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default timeout for transcription suggestions, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;

/// Default server base URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default language passed to the transcription suggestion endpoint.
pub const DEFAULT_LLM_LANGUAGE: &str = "German";
