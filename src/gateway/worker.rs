//! Background thread that executes page service requests in order.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{
    Completion, LineDto, OpKind, Outcome, PageService, RegionDto, SuggestRequest, TextUpdate,
};
use crate::error::GatewayError;
use crate::model::{Line, LocalId, PageRef, Region, ShapeRef};

/// Work item for the worker thread.
enum Operation {
    LoadPage,
    SaveRegion {
        local: LocalId,
        region: RegionDto,
    },
    SaveLine {
        local: LocalId,
        owner: LocalId,
        owner_id: Option<String>,
        line: LineDto,
    },
    DeleteRegion {
        local: LocalId,
        id: Option<String>,
    },
    DeleteLine {
        local: LocalId,
        id: Option<String>,
    },
    SaveTranscription {
        lines: Vec<(LocalId, Option<String>, String)>,
    },
    Suggest {
        local: LocalId,
        id: Option<String>,
        existing_text: String,
        language: String,
    },
}

impl Operation {
    fn kind(&self) -> OpKind {
        match self {
            Operation::LoadPage => OpKind::LoadPage,
            Operation::SaveRegion { local, .. } => OpKind::SaveRegion(*local),
            Operation::SaveLine { local, .. } => OpKind::SaveLine(*local),
            Operation::DeleteRegion { local, .. } => OpKind::DeleteRegion(*local),
            Operation::DeleteLine { local, .. } => OpKind::DeleteLine(*local),
            Operation::SaveTranscription { .. } => OpKind::SaveTranscription,
            Operation::Suggest { local, .. } => OpKind::Suggest(*local),
        }
    }
}

struct Request {
    seq: u64,
    page: PageRef,
    op: Operation,
}

/// Message sent to the worker thread.
enum ThreadMessage {
    Run(Request),
    /// Shutdown the thread
    Shutdown,
}

/// Server ids the worker has seen assigned, keyed by local id.
///
/// Lets a save queued before the creating save finished update the shape
/// instead of creating it twice, and lets a line find its new owner's id.
#[derive(Default)]
struct AssignedIds {
    ids: HashMap<ShapeRef, String>,
}

impl AssignedIds {
    fn resolve(&self, shape: ShapeRef, known: Option<String>) -> Option<String> {
        known.or_else(|| self.ids.get(&shape).cloned())
    }

    fn record(&mut self, shape: ShapeRef, id: Option<&String>) {
        if let Some(id) = id {
            self.ids.insert(shape, id.clone());
        }
    }
}

/// Queues page service requests to a single background thread.
pub struct PersistenceGateway {
    /// Sender for requests to the background thread
    request_tx: Sender<ThreadMessage>,
    /// Receiver for completions from the background thread
    result_rx: Receiver<Completion>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
    next_seq: u64,
    /// Requests submitted but not yet taken back
    pending: usize,
    /// Suggestion requests among `pending`
    suggesting: usize,
    /// Most recent save issued per shape
    latest: HashMap<ShapeRef, u64>,
}

impl PersistenceGateway {
    /// Spawn the worker thread around a page service.
    pub fn spawn(service: impl PageService) -> Result<Self, GatewayError> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let (result_tx, result_rx) = mpsc::channel::<Completion>();

        let thread_handle = thread::Builder::new()
            .name("persistence".to_string())
            .spawn(move || {
                log::debug!("Persistence worker started");
                Self::thread_loop(service, request_rx, result_tx);
                log::debug!("Persistence worker exiting");
            })
            .map_err(|e| GatewayError::Spawn(e.to_string()))?;

        Ok(Self {
            request_tx,
            result_rx,
            thread_handle: Some(thread_handle),
            next_seq: 0,
            pending: 0,
            suggesting: 0,
            latest: HashMap::new(),
        })
    }

    /// Background thread main loop.
    fn thread_loop(
        service: impl PageService,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<Completion>,
    ) {
        let mut assigned = AssignedIds::default();
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Run(request)) => {
                    let op = request.op.kind();
                    let result = Self::execute(&service, &mut assigned, &request.page, request.op);
                    if let Err(e) = &result {
                        log::warn!("{} failed: {}", op, e);
                    }
                    let completion = Completion {
                        seq: request.seq,
                        page: request.page,
                        op,
                        result,
                    };
                    if result_tx.send(completion).is_err() {
                        log::debug!("Completion channel closed, persistence worker exiting");
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(_) => {
                    // Channel closed, exit
                    break;
                }
            }
        }
    }

    fn execute(
        service: &impl PageService,
        assigned: &mut AssignedIds,
        page: &PageRef,
        op: Operation,
    ) -> Result<Outcome, GatewayError> {
        match op {
            Operation::LoadPage => {
                // Local ids from other pages never come back
                assigned.ids.clear();
                service.load_page(page).map(Outcome::Page)
            }
            Operation::SaveRegion { local, mut region } => {
                let shape = ShapeRef::Region(local);
                region.id = assigned.resolve(shape, region.id);
                let saved = service.save_region(page, &region)?;
                assigned.record(shape, saved.id.as_ref().or(region.id.as_ref()));
                Ok(Outcome::Region(saved))
            }
            Operation::SaveLine {
                local,
                owner,
                owner_id,
                mut line,
            } => {
                let shape = ShapeRef::Line(local);
                line.id = assigned.resolve(shape, line.id);
                line.region_id = assigned
                    .resolve(ShapeRef::Region(owner), owner_id)
                    .ok_or(GatewayError::UnsavedOwner)?;
                let saved = service.save_line(page, &line)?;
                assigned.record(shape, saved.id.as_ref().or(line.id.as_ref()));
                Ok(Outcome::Line(saved))
            }
            Operation::DeleteRegion { local, id } => {
                let shape = ShapeRef::Region(local);
                match assigned.resolve(shape, id) {
                    Some(id) => {
                        service.delete_region(page, &id)?;
                        assigned.ids.remove(&shape);
                    }
                    None => log::debug!("Region {} was never saved, nothing to delete", local),
                }
                Ok(Outcome::Deleted)
            }
            Operation::DeleteLine { local, id } => {
                let shape = ShapeRef::Line(local);
                match assigned.resolve(shape, id) {
                    Some(id) => {
                        service.delete_line(page, &id)?;
                        assigned.ids.remove(&shape);
                    }
                    None => log::debug!("Line {} was never saved, nothing to delete", local),
                }
                Ok(Outcome::Deleted)
            }
            Operation::SaveTranscription { lines } => {
                let updates: Vec<TextUpdate> = lines
                    .into_iter()
                    .filter_map(|(local, id, text)| {
                        match assigned.resolve(ShapeRef::Line(local), id) {
                            Some(id) => Some(TextUpdate { id, text }),
                            None => {
                                log::warn!("Skipping transcription of unsaved line {}", local);
                                None
                            }
                        }
                    })
                    .collect();
                if updates.is_empty() {
                    return Ok(Outcome::Updated(0));
                }
                service.save_transcription(page, &updates).map(Outcome::Updated)
            }
            Operation::Suggest {
                local,
                id,
                existing_text,
                language,
            } => {
                let line_id = assigned
                    .resolve(ShapeRef::Line(local), id)
                    .ok_or(GatewayError::NotSaved)?;
                let request = SuggestRequest {
                    line_id,
                    existing_text,
                    language,
                };
                service
                    .suggest_transcription(page, &request)
                    .map(Outcome::Suggestion)
            }
        }
    }

    fn submit(&mut self, page: &PageRef, op: Operation) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;

        let shape = match &op {
            Operation::SaveRegion { local, .. } => Some(ShapeRef::Region(*local)),
            Operation::SaveLine { local, .. } => Some(ShapeRef::Line(*local)),
            _ => None,
        };
        if let Some(shape) = shape {
            self.latest.insert(shape, seq);
        }

        let kind = op.kind();
        let request = Request {
            seq,
            page: page.clone(),
            op,
        };
        if self.request_tx.send(ThreadMessage::Run(request)).is_err() {
            log::error!("Failed to queue {}: persistence worker is gone", kind);
        } else {
            self.pending += 1;
            if matches!(kind, OpKind::Suggest(_)) {
                self.suggesting += 1;
            }
            log::debug!("Queued request {}: {}", seq, kind);
        }
        seq
    }

    pub fn load_page(&mut self, page: &PageRef) -> u64 {
        self.submit(page, Operation::LoadPage)
    }

    /// Create or update a region.
    pub fn save_region(&mut self, page: &PageRef, region: &Region) -> u64 {
        self.submit(
            page,
            Operation::SaveRegion {
                local: region.local,
                region: RegionDto::from(region),
            },
        )
    }

    /// Create or update a line. `owner_id` is the owning region's server id
    /// if the scene already knows it.
    pub fn save_line(&mut self, page: &PageRef, line: &Line, owner_id: Option<String>) -> u64 {
        self.submit(
            page,
            Operation::SaveLine {
                local: line.local,
                owner: line.region,
                line: LineDto::from_line(line, owner_id.as_deref()),
                owner_id,
            },
        )
    }

    pub fn delete_region(&mut self, page: &PageRef, region: &Region) -> u64 {
        self.latest.remove(&ShapeRef::Region(region.local));
        self.submit(
            page,
            Operation::DeleteRegion {
                local: region.local,
                id: region.id.clone(),
            },
        )
    }

    pub fn delete_line(&mut self, page: &PageRef, line: &Line) -> u64 {
        self.latest.remove(&ShapeRef::Line(line.local));
        self.submit(
            page,
            Operation::DeleteLine {
                local: line.local,
                id: line.id.clone(),
            },
        )
    }

    /// Store the transcriptions of `lines` in one request.
    pub fn save_transcription<'a>(
        &mut self,
        page: &PageRef,
        lines: impl IntoIterator<Item = &'a Line>,
    ) -> u64 {
        let lines = lines
            .into_iter()
            .map(|l| (l.local, l.id.clone(), l.text.clone()))
            .collect();
        self.submit(page, Operation::SaveTranscription { lines })
    }

    /// Ask for a transcription suggestion for one line.
    pub fn suggest_transcription(&mut self, page: &PageRef, line: &Line, language: &str) -> u64 {
        self.submit(
            page,
            Operation::Suggest {
                local: line.local,
                id: line.id.clone(),
                existing_text: line.text.trim().to_string(),
                language: language.to_string(),
            },
        )
    }

    /// True if `seq` is the most recent save issued for `shape`.
    pub fn is_latest(&self, shape: ShapeRef, seq: u64) -> bool {
        self.latest.get(&shape).is_none_or(|latest| *latest == seq)
    }

    /// Take one completion. Non-blocking.
    pub fn take_one_result(&mut self) -> Option<Completion> {
        match self.result_rx.try_recv() {
            Ok(completion) => {
                self.finish(&completion);
                Some(completion)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.pending > 0 {
                    log::warn!("Persistence worker disconnected with {} pending", self.pending);
                    self.pending = 0;
                    self.suggesting = 0;
                }
                None
            }
        }
    }

    /// Wait up to `timeout` for the next completion.
    pub fn wait_one(&mut self, timeout: Duration) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        match self.result_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.finish(&completion);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Persistence worker disconnected with {} pending", self.pending);
                self.pending = 0;
                self.suggesting = 0;
                None
            }
        }
    }

    fn finish(&mut self, completion: &Completion) {
        self.pending = self.pending.saturating_sub(1);
        if matches!(completion.op, OpKind::Suggest(_)) {
            self.suggesting = self.suggesting.saturating_sub(1);
        }
        let shape = match completion.op {
            OpKind::SaveRegion(local) => Some(ShapeRef::Region(local)),
            OpKind::SaveLine(local) => Some(ShapeRef::Line(local)),
            _ => None,
        };
        if let Some(shape) = shape {
            if self.latest.get(&shape) == Some(&completion.seq) {
                self.latest.remove(&shape);
            }
        }
    }

    /// Number of requests whose completion has not been taken yet.
    pub fn pending_count(&self) -> usize {
        self.pending
    }
}

impl Drop for PersistenceGateway {
    fn drop(&mut self) {
        log::debug!("Shutting down persistence worker");

        // Send shutdown signal; queued requests before it still run
        let _ = self.request_tx.send(ThreadMessage::Shutdown);

        // A suggestion may hold the worker for the whole recognition timeout.
        // Detach instead; the worker stops once its results have nowhere to go.
        if self.suggesting > 0 {
            log::info!("Leaving {} requests to finish in the background", self.pending);
            self.thread_handle.take();
            return;
        }

        // Wait for thread to finish
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Persistence worker panicked: {:?}", e);
            }
        }
    }
}
