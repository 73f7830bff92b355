//! Text line data.

use super::{LocalId, Point};

/// One line of text: an outline polygon, an optional baseline and its
/// transcription. A line always belongs to exactly one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Client-side handle
    pub local: LocalId,
    /// Server id, absent until the first save succeeds
    pub id: Option<String>,
    /// Owning region
    pub region: LocalId,
    /// Outline polygon in image pixels
    pub points: Vec<Point>,
    /// Baseline polyline, empty until set
    pub baseline: Vec<Point>,
    /// Transcription
    pub text: String,
    /// Recognition confidence reported by the server
    pub conf: Option<f64>,
}

impl Line {
    /// Create an unsaved line with no baseline and no text.
    pub fn new(local: LocalId, region: LocalId, points: Vec<Point>) -> Self {
        Self {
            local,
            id: None,
            region,
            points,
            baseline: Vec::new(),
            text: String::new(),
            conf: None,
        }
    }

    /// The outline or the baseline.
    pub fn point_array(&self, baseline: bool) -> &[Point] {
        if baseline { &self.baseline } else { &self.points }
    }

    /// Mutable access to the outline or the baseline.
    pub fn point_array_mut(&mut self, baseline: bool) -> &mut Vec<Point> {
        if baseline {
            &mut self.baseline
        } else {
            &mut self.points
        }
    }

    /// Hover text: the transcription, if there is any.
    pub fn title(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(self.text.as_str())
    }
}
