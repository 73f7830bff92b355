//! The editor: one application-state object that owns the page being edited.
//!
//! Every input event goes through [`Editor::handle_event`], which maps the
//! pointer into image space, hit-tests once, feeds the interaction state
//! machine and carries out the resulting [`Action`]. Saves are queued on the
//! [`PersistenceGateway`]; their completions are merged back by
//! [`Editor::poll_persistence`] or [`Editor::wait_for_saves`].

use std::collections::HashMap;
use std::time::Duration;

use pagegt_view::{
    Bounds, InputEvent, MouseButton, OverlayAnchor, OverlaySurface, RetainedOverlay, ScreenPoint,
    ViewerState, ViewingSurface,
};
use web_time::Instant;

use crate::config::{EditorConfig, EditorSettings};
use crate::constants::{MIN_LINE_POINTS, MIN_REGION_POINTS};
use crate::coords::CoordinateMapper;
use crate::error::{GatewayError, Unavailable};
use crate::gateway::{
    Completion, ImageInfo, OpKind, Outcome, PageData, PageService, PersistenceGateway, SavedLine,
    SavedRegion, Suggestion,
};
use crate::geometry::{self, find_containing_region};
use crate::interaction::{apply_drag, hit_test, Action, Gesture, Hit, HitParams, Interaction, Mode};
use crate::keybindings::{Command, KeyBindings};
use crate::model::{
    LocalId, Line, PageRef, Point, PointHandle, Region, RegionType, Selection, ShapeRef,
};
use crate::render::{OverlayRenderer, RenderFrame};
use crate::scene::{PageStats, SceneStore};

#[cfg(test)]
mod tests;

// ============================================================================
// Effects
// ============================================================================

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Something the host has to show in response to an editor call.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show the transcription popover for a line
    OpenTextEditor { line: LocalId, text: String },
    /// Hide the transcription popover
    CloseTextEditor,
    /// A transcription suggestion arrived for the open popover
    SuggestionReady { line: LocalId, text: String },
    Notify(Notice),
    /// A page finished loading
    PageLoaded(PageStats),
}

/// The transcription popover, open on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPopover {
    pub line: LocalId,
    /// Text the popover was opened with (or the last suggestion)
    pub text: String,
}

// ============================================================================
// Editor
// ============================================================================

/// Application state of the page editor.
pub struct Editor<O: OverlaySurface = RetainedOverlay> {
    settings: EditorSettings,
    keybindings: KeyBindings,
    scene: SceneStore,
    interaction: Interaction,
    viewer: ViewerState,
    overlay: O,
    renderer: OverlayRenderer,
    gateway: PersistenceGateway,
    /// Page being edited (or loading)
    page: Option<PageRef>,
    /// Raster of the loaded page
    image: Option<ImageInfo>,
    /// Sequence number of the load in flight
    pending_load: Option<u64>,
    popover: Option<TextPopover>,
    show_regions: bool,
    show_lines: bool,
}

impl<O: OverlaySurface> Editor<O> {
    /// Create an editor around a page service and an overlay surface.
    pub fn new(
        config: &EditorConfig,
        service: impl PageService,
        overlay: O,
    ) -> Result<Self, GatewayError> {
        let gateway = PersistenceGateway::spawn(service)?;
        Ok(Self {
            settings: config.editor.clone(),
            keybindings: config.keybindings.clone(),
            scene: SceneStore::new(),
            interaction: Interaction::new().with_click_threshold(config.editor.click_threshold_px),
            viewer: ViewerState::new(),
            overlay,
            renderer: OverlayRenderer::new(config.editor.handle_radius_px),
            gateway,
            page: None,
            image: None,
            pending_load: None,
            popover: None,
            show_regions: true,
            show_lines: true,
        })
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    /// Points collected in the current drawing mode.
    pub fn draft(&self) -> &[Point] {
        self.interaction.draft()
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn page(&self) -> Option<&PageRef> {
        self.page.as_ref()
    }

    /// Raster of the loaded page, for the host to display.
    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    pub fn popover(&self) -> Option<&TextPopover> {
        self.popover.as_ref()
    }

    /// (regions, lines) layer visibility.
    pub fn layer_visibility(&self) -> (bool, bool) {
        (self.show_regions, self.show_lines)
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Requests whose completion has not been merged yet.
    pub fn pending_requests(&self) -> usize {
        self.gateway.pending_count()
    }

    // ------------------------------------------------------------------------
    // Page lifecycle
    // ------------------------------------------------------------------------

    /// Drop the current page and start loading `page`.
    pub fn open_page(&mut self, page: PageRef) -> Vec<Effect> {
        let effects = self.clear_page();
        log::info!("Opening page {}", page);
        self.pending_load = Some(self.gateway.load_page(&page));
        self.page = Some(page);
        effects
    }

    /// Close the page and forget all shapes.
    pub fn reset(&mut self) -> Vec<Effect> {
        let effects = self.clear_page();
        self.page = None;
        effects
    }

    fn clear_page(&mut self) -> Vec<Effect> {
        // A drag in progress still belongs to the page being left
        let mut effects = self.end_gesture(false);
        effects.extend(self.close_popover());
        self.scene.clear();
        self.interaction.reset();
        self.viewer.close_image();
        self.image = None;
        self.pending_load = None;
        self.redraw();
        effects
    }

    /// The viewer widget moved or was resized.
    pub fn set_view_bounds(&mut self, bounds: Bounds) {
        if self.viewer.set_view_bounds(bounds) && self.image.is_some() {
            self.anchor_overlay();
            self.redraw();
        }
    }

    fn install_page(&mut self, data: PageData) -> Vec<Effect> {
        let mut by_server_id: HashMap<String, LocalId> = HashMap::new();
        let mut regions = Vec::with_capacity(data.regions.len());
        for dto in data.regions {
            if dto.points.len() < MIN_REGION_POINTS || !geometry::all_finite(&dto.points) {
                log::warn!(
                    "Skipping region {:?}: {} usable points",
                    dto.id,
                    dto.points.len()
                );
                continue;
            }
            let local = self.scene.allocate_id();
            if let Some(id) = &dto.id {
                by_server_id.insert(id.clone(), local);
            }
            let mut region = Region::new(local, dto.kind, dto.points);
            region.id = dto.id;
            region.conf = dto.conf;
            regions.push(region);
        }

        let mut lines = Vec::with_capacity(data.lines.len());
        for dto in data.lines {
            let Some(&owner) = by_server_id.get(&dto.region_id) else {
                log::warn!(
                    "Dropping line {:?}: region {:?} is not on this page",
                    dto.id,
                    dto.region_id
                );
                continue;
            };
            if dto.points.len() < MIN_LINE_POINTS || !geometry::all_finite(&dto.points) {
                log::warn!("Skipping line {:?}: {} usable points", dto.id, dto.points.len());
                continue;
            }
            let mut line = Line::new(self.scene.allocate_id(), owner, dto.points);
            line.id = dto.id;
            line.baseline = usable_baseline(dto.baseline);
            line.text = dto.text;
            line.conf = dto.conf;
            lines.push(line);
        }

        self.scene.load_page(regions, lines);
        self.viewer.open_image(data.image.width, data.image.height);
        self.image = Some(data.image);
        self.anchor_overlay();
        self.redraw();

        let stats = self.scene.stats();
        log::info!(
            "Loaded page: {} regions, {} lines",
            stats.regions_total,
            stats.lines_total
        );
        vec![Effect::PageLoaded(stats)]
    }

    fn anchor_overlay(&mut self) {
        let Some(image) = &self.image else {
            return;
        };
        let screen = self
            .viewer
            .transform()
            .map(|t| t.image_bounds())
            .unwrap_or_default();
        self.overlay.anchor(OverlayAnchor {
            image_width: f64::from(image.width),
            image_height: f64::from(image.height),
            screen,
        });
    }

    fn redraw(&mut self) {
        let scale = CoordinateMapper::new(&self.viewer).scale().unwrap_or(1.0);
        let frame = RenderFrame {
            mode: self.interaction.mode(),
            draft: self.interaction.draft(),
            scale,
            show_regions: self.show_regions,
            show_lines: self.show_lines,
        };
        let overlay = self.renderer.render(&self.scene, &frame);
        self.overlay.present(overlay);
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Dispatch one input event.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Effect> {
        match event {
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position,
            } => self.on_pointer_down(position),
            InputEvent::PointerMove { position } => self.on_pointer_move(position),
            InputEvent::PointerUp {
                button: MouseButton::Left,
                ..
            } => self.on_pointer_up(),
            InputEvent::DoubleClick { .. } => {
                let action = self.interaction.double_click();
                self.perform(action)
            }
            InputEvent::Wheel { delta, position } => {
                self.viewer.scroll(position, delta);
                self.redraw();
                Vec::new()
            }
            InputEvent::KeyPressed { key } => match self.keybindings.command_for_key(key) {
                Some(command) => self.run_command(command),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn on_pointer_down(&mut self, position: ScreenPoint) -> Vec<Effect> {
        let mapper = CoordinateMapper::new(&self.viewer);
        let Ok(image) = mapper.to_image_point(position) else {
            log::trace!("Ignoring press: no image");
            return Vec::new();
        };
        let hit = if self.interaction.mode().is_drawing() {
            None
        } else {
            match self.hit_params(&mapper) {
                Ok(params) => hit_test(&self.scene, image, &params),
                Err(Unavailable) => return Vec::new(),
            }
        };

        let action = self.interaction.pointer_down(position, image, hit);
        self.perform(action)
    }

    fn on_pointer_move(&mut self, position: ScreenPoint) -> Vec<Effect> {
        let mapper = CoordinateMapper::new(&self.viewer);
        let action = self.interaction.pointer_move(position, &mapper);
        self.perform(action)
    }

    fn on_pointer_up(&mut self) -> Vec<Effect> {
        self.viewer.end_pan();
        if self.viewer.is_pan_locked() {
            self.viewer.set_pan_lock(false);
        }
        let action = self.interaction.pointer_up();
        self.perform(action)
    }

    fn hit_params(&self, mapper: &CoordinateMapper<'_>) -> Result<HitParams, Unavailable> {
        Ok(HitParams {
            tolerance: mapper.image_units(self.settings.hit_tolerance_px)?,
            handle_radius: mapper.image_units(self.settings.handle_radius_px)?,
            show_regions: self.show_regions,
            show_lines: self.show_lines,
        })
    }

    fn run_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SelectMode => self.set_mode(Mode::Select),
            Command::AddRegionMode => self.set_mode(Mode::AddRegion),
            Command::AddLineMode => self.set_mode(Mode::AddLine),
            Command::Finish => self.finish_drawing(),
            Command::Cancel => self.cancel(),
            Command::Delete => self.delete_selection(),
            Command::ZoomIn => {
                self.zoom_in();
                Vec::new()
            }
            Command::ZoomOut => {
                self.zoom_out();
                Vec::new()
            }
            Command::Fit => {
                self.fit();
                Vec::new()
            }
            Command::ToggleRegions => self.set_layer_visibility(!self.show_regions, self.show_lines),
            Command::ToggleLines => self.set_layer_visibility(self.show_regions, !self.show_lines),
        }
    }

    /// Carry out what the interaction state machine decided.
    fn perform(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::None | Action::EndPan => Vec::new(),
            Action::Redraw => {
                self.redraw();
                Vec::new()
            }
            Action::ModeChanged { interactive } => {
                self.overlay.set_shapes_interactive(interactive);
                let effects = if interactive {
                    Vec::new()
                } else {
                    self.close_popover()
                };
                self.redraw();
                effects
            }
            Action::BeginDrag => {
                self.viewer.set_pan_lock(true);
                Vec::new()
            }
            Action::BeginPan(position) => {
                self.viewer.start_pan(position);
                Vec::new()
            }
            Action::Pan(position) => {
                self.viewer.update_pan(position);
                Vec::new()
            }
            Action::Drag { target, delta } => {
                if apply_drag(&mut self.scene, target, delta) {
                    self.redraw();
                }
                Vec::new()
            }
            Action::CommitDrag { target } => {
                log::debug!("Drag of {:?} finished", target);
                self.save_shape(target.shape());
                self.redraw();
                Vec::new()
            }
            Action::Click(hit) => self.select_hit(hit),
            Action::ClickEmpty => {
                self.scene.set_selection(Selection::None);
                let effects = self.close_popover();
                self.redraw();
                effects
            }
            Action::Finalize { mode, points } => {
                let effects = match mode {
                    Mode::AddRegion => self.create_region(points),
                    Mode::AddLine => self.create_line(points),
                    Mode::Select => Vec::new(),
                };
                self.redraw();
                effects
            }
            Action::Rejected(err) => {
                log::warn!("Cannot finish {}: {}", self.interaction.mode().name(), err);
                vec![Effect::Notify(Notice::error(err.to_string()))]
            }
        }
    }

    fn select_hit(&mut self, hit: Hit) -> Vec<Effect> {
        self.scene.set_selection(hit.selection());
        let line = match hit {
            Hit::Line { id, .. }
            | Hit::Handle(PointHandle {
                shape: ShapeRef::Line(id),
                ..
            }) => Some(id),
            _ => None,
        };
        let effects = match line {
            Some(id) => self.open_popover(id),
            None => self.close_popover(),
        };
        self.redraw();
        effects
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Finish the pointer gesture in progress early. A moved drag is saved,
    /// or rolled back when `abort` is set.
    fn end_gesture(&mut self, abort: bool) -> Vec<Effect> {
        let action = if abort {
            self.interaction.abort_gesture()
        } else {
            self.interaction.interrupt()
        };
        self.viewer.end_pan();
        self.viewer.set_pan_lock(false);
        self.perform(action)
    }

    /// Switch modes, discarding any shape being drawn. A drag in progress
    /// is kept and saved.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Effect> {
        let mut effects = self.end_gesture(false);
        let action = self.interaction.set_mode(mode);
        effects.extend(self.perform(action));
        effects
    }

    /// Finish the shape being drawn (Enter).
    pub fn finish_drawing(&mut self) -> Vec<Effect> {
        let action = self.interaction.finalize();
        self.perform(action)
    }

    /// Escape: undo a drag in progress, discard the shape being drawn, or
    /// close the popover.
    pub fn cancel(&mut self) -> Vec<Effect> {
        let mut effects = self.end_gesture(true);
        let action = self.interaction.cancel();
        effects.extend(self.perform(action));
        if !self.interaction.mode().is_drawing() {
            effects.extend(self.close_popover());
        }
        effects
    }

    pub fn zoom_in(&mut self) {
        self.viewer.zoom_in();
        self.redraw();
    }

    pub fn zoom_out(&mut self) {
        self.viewer.zoom_out();
        self.redraw();
    }

    /// Fit the page into view.
    pub fn fit(&mut self) {
        self.viewer.fit();
        self.redraw();
    }

    /// Show or hide the region and line layers. A selection on a hidden
    /// layer is dropped.
    pub fn set_layer_visibility(&mut self, regions: bool, lines: bool) -> Vec<Effect> {
        self.show_regions = regions;
        self.show_lines = lines;
        self.overlay.set_layer_visibility(regions, lines);

        let hidden = match self.scene.selection().shape() {
            Some((ShapeRef::Region(_), _)) => !regions,
            Some((ShapeRef::Line(_), _)) => !lines,
            None => false,
        };
        if hidden {
            self.scene.set_selection(Selection::None);
        }
        let effects = if lines {
            Vec::new()
        } else {
            self.close_popover()
        };
        self.redraw();
        effects
    }

    /// Delete the selected line, or the selected region with its lines.
    pub fn delete_selection(&mut self) -> Vec<Effect> {
        if self.interaction.mode() != Mode::Select {
            return Vec::new();
        }
        let Some(page) = &self.page else {
            return Vec::new();
        };

        let selection = self.scene.selection();
        if let Some(id) = selection.line() {
            if let Some(line) = self.scene.remove_line(id) {
                log::info!("Deleted line {}", id);
                self.gateway.delete_line(page, &line);
            }
        } else if let Some(id) = selection.region() {
            if let Some((region, lines)) = self.scene.remove_region(id) {
                log::info!("Deleted region {} with {} lines", id, lines.len());
                for line in &lines {
                    self.gateway.delete_line(page, line);
                }
                self.gateway.delete_region(page, &region);
            }
        } else {
            return Vec::new();
        }

        self.scene.set_selection(Selection::None);
        let orphaned = self
            .popover
            .as_ref()
            .is_some_and(|p| self.scene.line(p.line).is_none());
        let effects = if orphaned {
            self.close_popover()
        } else {
            Vec::new()
        };
        self.redraw();
        effects
    }

    // ------------------------------------------------------------------------
    // Shape creation
    // ------------------------------------------------------------------------

    fn create_region(&mut self, points: Vec<Point>) -> Vec<Effect> {
        let Some(page) = &self.page else {
            log::warn!("No page open, discarding {} points", points.len());
            return Vec::new();
        };
        let local = self.scene.allocate_id();
        let region = Region::new(local, self.settings.default_region_type.clone(), points);
        self.gateway.save_region(page, &region);
        log::info!("Created {} {}", region.kind, local);
        self.scene.upsert_region(region);
        self.scene.set_selection(Selection::Region(local));
        Vec::new()
    }

    fn create_line(&mut self, points: Vec<Point>) -> Vec<Effect> {
        if self.page.is_none() {
            log::warn!("No page open, discarding {} points", points.len());
            return Vec::new();
        }
        let Some(owner) = self.line_owner(&points) else {
            return Vec::new();
        };
        let Some(page) = &self.page else {
            return Vec::new();
        };

        let local = self.scene.allocate_id();
        let line = Line::new(local, owner, points);
        let owner_id = self.scene.region(owner).and_then(|r| r.id.clone());
        self.gateway.save_line(page, &line, owner_id);
        log::info!("Created line {} in region {}", local, owner);
        if self.scene.upsert_line(line) {
            self.scene.set_selection(Selection::Line {
                id: local,
                baseline: false,
            });
        }
        Vec::new()
    }

    /// Region a new line belongs to: the selected region, else the smallest
    /// region containing the line, else a new padded rectangle around it.
    fn line_owner(&mut self, points: &[Point]) -> Option<LocalId> {
        if let Some(id) = self.scene.selection().region() {
            if self.scene.region(id).is_some() {
                return Some(id);
            }
        }
        if let Some(region) = find_containing_region(points, self.scene.regions()) {
            return Some(region.local);
        }

        let Some(bounds) = geometry::bounding_box(points) else {
            log::warn!("Cannot place a line without points");
            return None;
        };
        let page = self.page.as_ref()?;
        let local = self.scene.allocate_id();
        let region = Region::new(
            local,
            RegionType::Text,
            bounds.expand(self.settings.region_padding).to_polygon(),
        );
        log::info!("No region contains the new line, creating {}", local);
        self.gateway.save_region(page, &region);
        self.scene.upsert_region(region);
        Some(local)
    }

    fn save_shape(&mut self, shape: ShapeRef) {
        let Some(page) = &self.page else {
            log::warn!("No page open, not saving {:?}", shape);
            return;
        };
        match shape {
            ShapeRef::Region(id) => match self.scene.region(id) {
                Some(region) if region.is_drawable() => {
                    self.gateway.save_region(page, region);
                }
                Some(_) => log::warn!("Region {} has too few points to save", id),
                None => log::warn!("Region {} vanished before it could be saved", id),
            },
            ShapeRef::Line(id) => match self.scene.line(id) {
                Some(line) => {
                    let owner_id = self.scene.region(line.region).and_then(|r| r.id.clone());
                    self.gateway.save_line(page, line, owner_id);
                }
                None => log::warn!("Line {} vanished before it could be saved", id),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Transcription
    // ------------------------------------------------------------------------

    fn open_popover(&mut self, line: LocalId) -> Vec<Effect> {
        if self.popover.as_ref().is_some_and(|p| p.line == line) {
            return Vec::new();
        }
        let Some(text) = self.scene.line(line).map(|l| l.text.clone()) else {
            return self.close_popover();
        };
        self.popover = Some(TextPopover {
            line,
            text: text.clone(),
        });
        vec![Effect::OpenTextEditor { line, text }]
    }

    fn close_popover(&mut self) -> Vec<Effect> {
        match self.popover.take() {
            Some(_) => vec![Effect::CloseTextEditor],
            None => Vec::new(),
        }
    }

    /// Store the popover's edited text on its line and save the line.
    pub fn commit_line_text(&mut self, text: &str) -> Vec<Effect> {
        let Some(popover) = self.popover.take() else {
            return Vec::new();
        };
        match self.scene.line_mut(popover.line) {
            Some(line) => line.text = text.to_string(),
            None => {
                log::warn!("Line {} is gone, dropping its text", popover.line);
                return vec![Effect::CloseTextEditor];
            }
        }
        self.save_shape(ShapeRef::Line(popover.line));
        self.redraw();
        vec![Effect::CloseTextEditor]
    }

    /// Close the popover without saving.
    pub fn dismiss_popover(&mut self) -> Vec<Effect> {
        self.close_popover()
    }

    /// Save the transcription of every line in one request.
    pub fn save_transcriptions(&mut self) {
        let Some(page) = &self.page else {
            return;
        };
        self.gateway.save_transcription(page, self.scene.lines());
    }

    /// Ask the recognition service for the popover's line (or the selected
    /// line).
    pub fn suggest_transcription(&mut self) -> Vec<Effect> {
        let target = self
            .popover
            .as_ref()
            .map(|p| p.line)
            .or_else(|| self.scene.selection().line());
        let (Some(page), Some(line)) = (&self.page, target.and_then(|id| self.scene.line(id)))
        else {
            return vec![Effect::Notify(Notice::error("select a line first"))];
        };
        log::info!("Requesting transcription for line {}", line.local);
        self.gateway
            .suggest_transcription(page, line, &self.settings.llm_language);
        Vec::new()
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Merge every completion that has arrived. Non-blocking.
    pub fn poll_persistence(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(completion) = self.gateway.take_one_result() {
            effects.extend(self.apply_completion(completion));
        }
        effects
    }

    /// Block until every queued request has completed or `timeout` passes.
    pub fn wait_for_saves(&mut self, timeout: Duration) -> Vec<Effect> {
        let deadline = Instant::now() + timeout;
        let mut effects = Vec::new();
        while self.gateway.pending_count() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "Gave up waiting with {} requests pending",
                    self.gateway.pending_count()
                );
                break;
            }
            if let Some(completion) = self.gateway.wait_one(remaining) {
                effects.extend(self.apply_completion(completion));
            }
        }
        effects
    }

    pub(crate) fn apply_completion(&mut self, completion: Completion) -> Vec<Effect> {
        let Completion {
            seq,
            page,
            op,
            result,
        } = completion;
        if self.page.as_ref() != Some(&page) {
            log::debug!("Dropping result of {} for {}: page closed", op, page);
            return Vec::new();
        }

        match (op, result) {
            (OpKind::LoadPage, result) => self.finish_load(seq, result),
            (op, Err(err)) => {
                log::warn!("Failed to {}: {}", op, err);
                vec![Effect::Notify(Notice::error(format!("Failed to {op}: {err}")))]
            }
            (OpKind::SaveRegion(local), Ok(Outcome::Region(saved))) => {
                self.merge_region(seq, local, saved);
                Vec::new()
            }
            (OpKind::SaveLine(local), Ok(Outcome::Line(saved))) => {
                self.merge_line(seq, local, saved);
                Vec::new()
            }
            (OpKind::Suggest(local), Ok(Outcome::Suggestion(suggestion))) => {
                self.apply_suggestion(local, suggestion)
            }
            (OpKind::SaveTranscription, Ok(Outcome::Updated(count))) => {
                log::info!("Saved {} transcriptions", count);
                vec![Effect::Notify(Notice::info(format!(
                    "saved {count} transcriptions"
                )))]
            }
            (_, Ok(Outcome::Deleted)) => Vec::new(),
            (op, Ok(other)) => {
                log::warn!("Unexpected result for {}: {:?}", op, other);
                Vec::new()
            }
        }
    }

    fn finish_load(&mut self, seq: u64, result: Result<Outcome, GatewayError>) -> Vec<Effect> {
        if self.pending_load != Some(seq) {
            log::debug!("Ignoring superseded page load {}", seq);
            return Vec::new();
        }
        self.pending_load = None;
        match result {
            Ok(Outcome::Page(data)) => self.install_page(data),
            Ok(other) => {
                log::warn!("Page load returned {:?}", other);
                Vec::new()
            }
            Err(err) => {
                log::error!("Failed to load page: {}", err);
                vec![Effect::Notify(Notice::error(format!(
                    "Failed to load page: {err}"
                )))]
            }
        }
    }

    /// True while the user is dragging `shape`; its geometry is theirs.
    fn is_dragging(&self, shape: ShapeRef) -> bool {
        match self.interaction.gesture() {
            Gesture::Dragging { hit, .. } => hit.drag_target().shape() == shape,
            _ => false,
        }
    }

    fn merge_region(&mut self, seq: u64, local: LocalId, saved: SavedRegion) {
        let shape = ShapeRef::Region(local);
        let fresh = self.gateway.is_latest(shape, seq) && !self.is_dragging(shape);
        let Some(unsaved) = self.scene.region(local).map(|region| region.id.is_none()) else {
            log::debug!("Region {} was removed before its save completed", local);
            return;
        };
        if let Some(id) = saved.id {
            if unsaved {
                log::info!("Region {} saved as {}", local, id);
            }
            self.scene.assign_region_id(local, id);
        }
        if !fresh {
            log::debug!("Keeping local geometry of region {}: newer save pending", local);
            return;
        }
        let Some(region) = self.scene.region_mut(local) else {
            return;
        };
        // Fields missing from the reply keep their local value
        if let Some(points) = saved.points {
            if points.len() >= MIN_REGION_POINTS && geometry::all_finite(&points) {
                region.points = points;
            }
        }
        if let Some(kind) = saved.kind {
            region.kind = kind;
        }
        region.conf = saved.conf.or(region.conf);
        self.redraw();
    }

    fn merge_line(&mut self, seq: u64, local: LocalId, saved: SavedLine) {
        let shape = ShapeRef::Line(local);
        let fresh = self.gateway.is_latest(shape, seq) && !self.is_dragging(shape);
        let Some(unsaved) = self.scene.line(local).map(|line| line.id.is_none()) else {
            log::debug!("Line {} was removed before its save completed", local);
            return;
        };
        if let Some(id) = saved.id {
            if unsaved {
                log::info!("Line {} saved as {}", local, id);
            }
            self.scene.assign_line_id(local, id);
        }
        if !fresh {
            log::debug!("Keeping local geometry of line {}: newer save pending", local);
            return;
        }
        let Some(line) = self.scene.line_mut(local) else {
            return;
        };
        if let Some(points) = saved.points {
            if points.len() >= MIN_LINE_POINTS && geometry::all_finite(&points) {
                line.points = points;
            }
        }
        if let Some(baseline) = saved.baseline {
            line.baseline = usable_baseline(baseline);
        }
        if let Some(text) = saved.text {
            line.text = text;
        }
        line.conf = saved.conf.or(line.conf);
        self.redraw();
    }

    fn apply_suggestion(&mut self, local: LocalId, suggestion: Suggestion) -> Vec<Effect> {
        match &mut self.popover {
            Some(popover) if popover.line == local => {
                log::debug!(
                    "Suggestion for line {} ({})",
                    local,
                    suggestion.mode.as_deref().unwrap_or("unknown mode")
                );
                popover.text = suggestion.transcription.clone();
                vec![Effect::SuggestionReady {
                    line: local,
                    text: suggestion.transcription,
                }]
            }
            _ => {
                log::debug!("Popover moved on, dropping suggestion for line {}", local);
                Vec::new()
            }
        }
    }
}

/// A baseline needs two points; anything shorter is dropped.
fn usable_baseline(baseline: Vec<Point>) -> Vec<Point> {
    if baseline.is_empty() || (baseline.len() >= MIN_LINE_POINTS && geometry::all_finite(&baseline)) {
        baseline
    } else {
        log::warn!("Dropping baseline with {} points", baseline.len());
        Vec::new()
    }
}
