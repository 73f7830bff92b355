//! Persistence gateway: talks to the page service on a background thread.
//!
//! The editor hands shapes to [`PersistenceGateway`], which queues them to a
//! single worker thread owning a [`PageService`]. Requests are executed in
//! submission order; completions come back through a channel and are merged
//! into the scene by the editor.

mod http;
mod wire;
mod worker;

use std::fmt;

pub use http::HttpPageService;
pub use wire::{
    ImageInfo, LineDto, PageData, RegionDto, SavedLine, SavedRegion, SuggestRequest, Suggestion,
    TextUpdate,
};
pub use worker::PersistenceGateway;

use crate::error::GatewayError;
use crate::model::{LocalId, PageRef};

/// The remote page store.
///
/// Implementations run on the gateway's worker thread and may block.
pub trait PageService: Send + 'static {
    /// Fetch a page's image info and geometry.
    fn load_page(&self, page: &PageRef) -> Result<PageData, GatewayError>;

    /// Create (no id) or update a region.
    fn save_region(&self, page: &PageRef, region: &RegionDto) -> Result<SavedRegion, GatewayError>;

    fn delete_region(&self, page: &PageRef, region_id: &str) -> Result<(), GatewayError>;

    /// Create (no id) or update a line.
    fn save_line(&self, page: &PageRef, line: &LineDto) -> Result<SavedLine, GatewayError>;

    fn delete_line(&self, page: &PageRef, line_id: &str) -> Result<(), GatewayError>;

    /// Store transcriptions; returns how many lines were updated.
    fn save_transcription(
        &self,
        page: &PageRef,
        lines: &[TextUpdate],
    ) -> Result<usize, GatewayError>;

    /// Ask the recognition service for a transcription of one line.
    fn suggest_transcription(
        &self,
        page: &PageRef,
        request: &SuggestRequest,
    ) -> Result<Suggestion, GatewayError>;
}

/// Which request a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    LoadPage,
    SaveRegion(LocalId),
    SaveLine(LocalId),
    DeleteRegion(LocalId),
    DeleteLine(LocalId),
    SaveTranscription,
    Suggest(LocalId),
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::LoadPage => write!(f, "load page"),
            OpKind::SaveRegion(id) => write!(f, "save region {id}"),
            OpKind::SaveLine(id) => write!(f, "save line {id}"),
            OpKind::DeleteRegion(id) => write!(f, "delete region {id}"),
            OpKind::DeleteLine(id) => write!(f, "delete line {id}"),
            OpKind::SaveTranscription => write!(f, "save transcriptions"),
            OpKind::Suggest(id) => write!(f, "suggest transcription for line {id}"),
        }
    }
}

/// Successful result of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Page(PageData),
    /// The region as stored by the server
    Region(SavedRegion),
    /// The line as stored by the server
    Line(SavedLine),
    Deleted,
    /// Number of transcriptions updated
    Updated(usize),
    Suggestion(Suggestion),
}

/// A finished request, as delivered to the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Sequence number returned when the request was submitted
    pub seq: u64,
    pub page: PageRef,
    pub op: OpKind,
    pub result: Result<Outcome, GatewayError>,
}
