//! Data models for the page editor.

mod line;
mod region;

use std::fmt;

pub use line::Line;
pub use pagegt_view::Point;
pub use region::{Region, RegionType};

/// Client-side handle for a region or line.
///
/// Every shape gets one as soon as it enters the scene, long before the
/// server assigns it an id. Handles are never reused within one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u64);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a shape of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeRef {
    Region(LocalId),
    Line(LocalId),
}

impl ShapeRef {
    pub fn local(&self) -> LocalId {
        match self {
            ShapeRef::Region(id) | ShapeRef::Line(id) => *id,
        }
    }
}

/// A single vertex of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointHandle {
    /// Shape owning the vertex
    pub shape: ShapeRef,
    /// Index into the shape's point array
    pub index: usize,
    /// The index refers to the line's baseline instead of its outline
    pub baseline: bool,
}

/// What is currently selected. At most one thing at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Region(LocalId),
    Line {
        id: LocalId,
        /// The baseline was clicked, so its vertices get the handles
        baseline: bool,
    },
    Point(PointHandle),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// The shape whose handles should be shown, with the baseline flag.
    pub fn shape(&self) -> Option<(ShapeRef, bool)> {
        match self {
            Selection::None => None,
            Selection::Region(id) => Some((ShapeRef::Region(*id), false)),
            Selection::Line { id, baseline } => Some((ShapeRef::Line(*id), *baseline)),
            Selection::Point(handle) => Some((handle.shape, handle.baseline)),
        }
    }

    /// The selected region, if the selection is a region or one of its vertices.
    pub fn region(&self) -> Option<LocalId> {
        match self.shape() {
            Some((ShapeRef::Region(id), _)) => Some(id),
            _ => None,
        }
    }

    /// The selected line, if the selection is a line or one of its vertices.
    pub fn line(&self) -> Option<LocalId> {
        match self.shape() {
            Some((ShapeRef::Line(id), _)) => Some(id),
            _ => None,
        }
    }
}

/// Identifies a page on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRef {
    pub workspace_id: String,
    pub path: String,
}

impl PageRef {
    pub fn new(workspace_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.path)
    }
}
