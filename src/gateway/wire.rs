//! JSON shapes exchanged with the page service.
//!
//! Points are `[x, y]` pairs in image pixels. Unknown fields are ignored so
//! the server can add data without breaking older editors.

use serde::{Deserialize, Serialize};

use crate::model::{Line, Point, Region, RegionType};

/// A region as the server sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: RegionType,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
}

impl From<&Region> for RegionDto {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            kind: region.kind.clone(),
            points: region.points.clone(),
            conf: None,
        }
    }
}

/// A text line as the server sees it. `region_id` is the owner's server id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub region_id: String,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub baseline: Vec<Point>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f64>,
}

impl LineDto {
    /// Wire form of a line; `region_id` is filled in once the owner is known.
    pub fn from_line(line: &Line, region_id: Option<&str>) -> Self {
        Self {
            id: line.id.clone(),
            region_id: region_id.unwrap_or_default().to_string(),
            points: line.points.clone(),
            baseline: line.baseline.clone(),
            text: line.text.clone(),
            conf: None,
        }
    }
}

/// A region as echoed back by a save. Only fields the server sent are set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SavedRegion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<RegionType>,
    #[serde(default)]
    pub points: Option<Vec<Point>>,
    #[serde(default)]
    pub conf: Option<f64>,
}

impl From<RegionDto> for SavedRegion {
    fn from(dto: RegionDto) -> Self {
        Self {
            id: dto.id,
            kind: Some(dto.kind),
            points: Some(dto.points),
            conf: dto.conf,
        }
    }
}

/// A line as echoed back by a save. Only fields the server sent are set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SavedLine {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub points: Option<Vec<Point>>,
    #[serde(default)]
    pub baseline: Option<Vec<Point>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub conf: Option<f64>,
}

impl From<LineDto> for SavedLine {
    fn from(dto: LineDto) -> Self {
        Self {
            id: dto.id,
            region_id: Some(dto.region_id),
            points: Some(dto.points),
            baseline: Some(dto.baseline),
            text: Some(dto.text),
            conf: dto.conf,
        }
    }
}

/// The page raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Response of the page endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub image: ImageInfo,
    #[serde(default)]
    pub regions: Vec<RegionDto>,
    #[serde(default)]
    pub lines: Vec<LineDto>,
    /// Server-side statistics, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
}

/// One transcription change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUpdate {
    pub id: String,
    pub text: String,
}

/// Parameters of a transcription suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestRequest {
    pub line_id: String,
    pub existing_text: String,
    pub language: String,
}

/// A transcription proposed by the recognition service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Suggestion {
    pub transcription: String,
    /// `transcribe` for empty lines, `correct` otherwise
    #[serde(default)]
    pub mode: Option<String>,
}
