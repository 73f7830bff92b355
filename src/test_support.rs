//! Shared fixtures: an in-memory page service that records every call.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::GatewayError;
use crate::gateway::{
    ImageInfo, LineDto, PageData, PageService, RegionDto, SavedLine, SavedRegion, SuggestRequest,
    Suggestion, TextUpdate,
};
use crate::model::{PageRef, Point, RegionType};

/// One request received by [`RecordingService`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadPage(PageRef),
    SaveRegion(RegionDto),
    DeleteRegion(String),
    SaveLine(LineDto),
    DeleteLine(String),
    SaveTranscription(Vec<TextUpdate>),
    Suggest(SuggestRequest),
}

#[derive(Default)]
struct ServiceState {
    page: Option<PageData>,
    failures: VecDeque<GatewayError>,
    next_region: u64,
    next_line: u64,
}

/// Echoes saves back with fresh ids (`region-N`, `line-N`) and records calls.
#[derive(Clone, Default)]
pub struct RecordingService {
    calls: Arc<Mutex<Vec<Call>>>,
    state: Arc<Mutex<ServiceState>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` from `load_page`.
    pub fn with_page(self, page: PageData) -> Self {
        self.state.lock().unwrap().page = Some(page);
        self
    }

    /// Make the next request fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    /// Shared handle to the call log.
    pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.state.lock().unwrap().failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl PageService for RecordingService {
    fn load_page(&self, page: &PageRef) -> Result<PageData, GatewayError> {
        self.record(Call::LoadPage(page.clone()))?;
        self.state
            .lock()
            .unwrap()
            .page
            .clone()
            .ok_or_else(|| GatewayError::http(404, "page not found"))
    }

    fn save_region(&self, _page: &PageRef, region: &RegionDto) -> Result<SavedRegion, GatewayError> {
        self.record(Call::SaveRegion(region.clone()))?;
        let mut saved = region.clone();
        if saved.id.is_none() {
            let mut state = self.state.lock().unwrap();
            state.next_region += 1;
            saved.id = Some(format!("region-{}", state.next_region));
        }
        Ok(saved.into())
    }

    fn delete_region(&self, _page: &PageRef, region_id: &str) -> Result<(), GatewayError> {
        self.record(Call::DeleteRegion(region_id.to_string()))
    }

    fn save_line(&self, _page: &PageRef, line: &LineDto) -> Result<SavedLine, GatewayError> {
        self.record(Call::SaveLine(line.clone()))?;
        let mut saved = line.clone();
        if saved.id.is_none() {
            let mut state = self.state.lock().unwrap();
            state.next_line += 1;
            saved.id = Some(format!("line-{}", state.next_line));
        }
        Ok(saved.into())
    }

    fn delete_line(&self, _page: &PageRef, line_id: &str) -> Result<(), GatewayError> {
        self.record(Call::DeleteLine(line_id.to_string()))
    }

    fn save_transcription(
        &self,
        _page: &PageRef,
        lines: &[TextUpdate],
    ) -> Result<usize, GatewayError> {
        self.record(Call::SaveTranscription(lines.to_vec()))?;
        Ok(lines.len())
    }

    fn suggest_transcription(
        &self,
        _page: &PageRef,
        request: &SuggestRequest,
    ) -> Result<Suggestion, GatewayError> {
        self.record(Call::Suggest(request.clone()))?;
        let mode = if request.existing_text.is_empty() {
            "transcribe"
        } else {
            "correct"
        };
        Ok(Suggestion {
            transcription: format!("suggested for {}", request.line_id),
            mode: Some(mode.to_string()),
        })
    }
}

/// Axis-aligned rectangle as a point list.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

pub fn region_dto(id: &str, kind: RegionType, points: Vec<Point>) -> RegionDto {
    RegionDto {
        id: Some(id.to_string()),
        kind,
        points,
        conf: None,
    }
}

pub fn line_dto(id: &str, region_id: &str, points: Vec<Point>, text: &str) -> LineDto {
    LineDto {
        id: Some(id.to_string()),
        region_id: region_id.to_string(),
        points,
        baseline: Vec::new(),
        text: text.to_string(),
        conf: None,
    }
}

/// A 1000x1000 page with the given shapes.
pub fn page_data(regions: Vec<RegionDto>, lines: Vec<LineDto>) -> PageData {
    PageData {
        image: ImageInfo {
            url: "/api/page/image".to_string(),
            width: 1000,
            height: 1000,
        },
        regions,
        lines,
        stats: None,
    }
}
