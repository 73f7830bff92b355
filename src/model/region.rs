//! Region type and data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LocalId, Point};

/// Region classification.
///
/// The set of PAGE region types is open; anything unrecognized is kept
/// verbatim in `Other` and drawn with the fallback style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegionType {
    #[default]
    Text,
    Table,
    Image,
    Separator,
    Maths,
    Heading,
    Graphic,
    Other(String),
}

impl RegionType {
    /// Parse a type name, case-insensitive, with or without the `Region` suffix.
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let base = lower.strip_suffix("region").unwrap_or(&lower);
        match base {
            "text" => RegionType::Text,
            "table" => RegionType::Table,
            "image" => RegionType::Image,
            "separator" => RegionType::Separator,
            "maths" | "math" => RegionType::Maths,
            "heading" => RegionType::Heading,
            "graphic" => RegionType::Graphic,
            _ => RegionType::Other(name.trim().to_string()),
        }
    }

    /// The PAGE type name.
    pub fn name(&self) -> &str {
        match self {
            RegionType::Text => "TextRegion",
            RegionType::Table => "TableRegion",
            RegionType::Image => "ImageRegion",
            RegionType::Separator => "SeparatorRegion",
            RegionType::Maths => "MathsRegion",
            RegionType::Heading => "HeadingRegion",
            RegionType::Graphic => "GraphicRegion",
            RegionType::Other(name) => name,
        }
    }
}

impl From<String> for RegionType {
    fn from(name: String) -> Self {
        RegionType::parse(&name)
    }
}

impl From<RegionType> for String {
    fn from(kind: RegionType) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified polygon area on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Client-side handle
    pub local: LocalId,
    /// Server id, absent until the first save succeeds
    pub id: Option<String>,
    /// Classification
    pub kind: RegionType,
    /// Closed polygon in image pixels
    pub points: Vec<Point>,
    /// Detection confidence reported by the server
    pub conf: Option<f64>,
}

impl Region {
    /// Create an unsaved region.
    pub fn new(local: LocalId, kind: RegionType, points: Vec<Point>) -> Self {
        Self {
            local,
            id: None,
            kind,
            points,
            conf: None,
        }
    }

    /// Set the server id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// A region needs at least three vertices to be drawn or saved.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= crate::constants::MIN_REGION_POINTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!(RegionType::parse("TextRegion"), RegionType::Text);
        assert_eq!(RegionType::parse("tableregion"), RegionType::Table);
        assert_eq!(RegionType::parse("SEPARATORREGION"), RegionType::Separator);
        assert_eq!(RegionType::parse("MathsRegion"), RegionType::Maths);
        assert_eq!(RegionType::parse("heading"), RegionType::Heading);
    }

    #[test]
    fn unknown_types_are_kept_verbatim() {
        let kind = RegionType::parse("ChartRegion");
        assert_eq!(kind, RegionType::Other("ChartRegion".to_string()));
        assert_eq!(kind.name(), "ChartRegion");
    }

    #[test]
    fn serializes_as_page_name() {
        let json = serde_json::to_string(&RegionType::Image).unwrap();
        assert_eq!(json, "\"ImageRegion\"");
        let back: RegionType = serde_json::from_str("\"imageregion\"").unwrap();
        assert_eq!(back, RegionType::Image);
    }
}
