//! pagegt - PAGE ground-truth geometry editor core
//!
//! An in-memory scene of text regions and lines over a zoomable page image.
//! Pointer input is mapped into image space, hit-tested and turned into
//! edits; the overlay is re-rendered after every change and committed edits
//! are persisted to a remote page service on a background thread.
//!
//! The host (a GUI, a browser bridge or the headless `pagegt` binary) owns
//! an [`Editor`], feeds it [`pagegt_view::InputEvent`]s and shows the
//! [`editor::Effect`]s it returns.

pub mod config;
pub mod constants;
pub mod coords;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod geometry;
pub mod interaction;
pub mod keybindings;
pub mod model;
pub mod render;
pub mod scene;

#[cfg(test)]
mod test_support;

pub use config::EditorConfig;
pub use editor::{Editor, Effect, Notice};
pub use error::{GatewayError, Unavailable, ValidationError};
pub use gateway::{HttpPageService, PageService, PersistenceGateway};
pub use model::{Line, LocalId, PageRef, Point, Region, RegionType};
pub use scene::{PageStats, SceneStore};
