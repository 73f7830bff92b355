//! Interaction modes, gestures and hit-testing.
//!
//! [`Interaction`] owns the mode, the gesture sub-state and the draw buffer.
//! Its transition functions take an already hit-tested event and return an
//! [`Action`] describing what the editor has to do to the scene. It never
//! touches the scene itself.

use pagegt_view::ScreenPoint;

use crate::constants::{
    DEFAULT_CLICK_THRESHOLD_PX, DRAG_EPSILON, DUPLICATE_POINT_EPSILON, MIN_LINE_POINTS,
    MIN_REGION_POINTS,
};
use crate::coords::CoordinateMapper;
use crate::error::ValidationError;
use crate::geometry::{self, Delta};
use crate::model::{LocalId, Point, PointHandle, Selection, ShapeRef};
use crate::scene::SceneStore;

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Select and drag existing shapes
    #[default]
    Select,
    /// Click points of a new region polygon
    AddRegion,
    /// Click points of a new line
    AddLine,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::AddRegion => "addRegion",
            Mode::AddLine => "addLine",
        }
    }

    /// Check if this mode collects draw points.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, Mode::Select)
    }

    /// Minimum number of points to finish a shape in this mode.
    pub fn min_points(&self) -> usize {
        match self {
            Mode::Select => 0,
            Mode::AddRegion => MIN_REGION_POINTS,
            Mode::AddLine => MIN_LINE_POINTS,
        }
    }
}

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A vertex handle of the current selection
    Handle(PointHandle),
    /// A line's outline or, with `baseline`, its baseline
    Line { id: LocalId, baseline: bool },
    /// A region's polygon
    Region(LocalId),
}

impl Hit {
    /// What dragging from this hit moves.
    pub fn drag_target(&self) -> DragTarget {
        match *self {
            Hit::Handle(handle) => DragTarget::Point(handle),
            Hit::Line { id, .. } => DragTarget::Line(id),
            Hit::Region(id) => DragTarget::Region(id),
        }
    }

    /// What clicking this hit selects.
    pub fn selection(&self) -> Selection {
        match *self {
            Hit::Handle(handle) => Selection::Point(handle),
            Hit::Line { id, baseline } => Selection::Line { id, baseline },
            Hit::Region(id) => Selection::Region(id),
        }
    }
}

/// The thing being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// A single vertex
    Point(PointHandle),
    /// Every vertex of a region
    Region(LocalId),
    /// Outline and baseline of a line
    Line(LocalId),
}

impl DragTarget {
    /// The shape that has to be saved after the drag.
    pub fn shape(&self) -> ShapeRef {
        match self {
            DragTarget::Point(handle) => handle.shape,
            DragTarget::Region(id) => ShapeRef::Region(*id),
            DragTarget::Line(id) => ShapeRef::Line(*id),
        }
    }
}

/// Pointer gesture sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No button held
    #[default]
    Idle,
    /// Pressed on a shape; no movement yet, so release is still a click
    PotentialDrag { hit: Hit, last: ScreenPoint },
    /// Pressed on a shape and moved
    Dragging {
        hit: Hit,
        last: ScreenPoint,
        /// Movement applied to the target so far
        total: Delta,
    },
    /// Pressed on empty canvas (or anywhere in a drawing mode)
    Panning {
        /// Image position of the press
        press: Point,
        /// Screen position of the press
        origin: ScreenPoint,
        /// Set once the pointer left the click threshold
        moved: bool,
    },
}

/// What the editor must do in response to a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing changed
    None,
    /// Only the overlay needs redrawing (draw buffer changed)
    Redraw,
    /// The mode changed; shape interactivity must follow
    ModeChanged { interactive: bool },
    /// A shape was pressed: lock pan/zoom
    BeginDrag,
    /// Start panning the surface from this screen position
    BeginPan(ScreenPoint),
    /// Continue panning the surface
    Pan(ScreenPoint),
    /// Move the target by `delta` and redraw
    Drag { target: DragTarget, delta: Delta },
    /// The drag moved something: unlock and save the shape once
    CommitDrag { target: DragTarget },
    /// Press and release on a shape without movement
    Click(Hit),
    /// Press and release on empty canvas in select mode
    ClickEmpty,
    /// A pan gesture ended
    EndPan,
    /// The draw buffer forms a valid new shape
    Finalize { mode: Mode, points: Vec<Point> },
    /// The draw buffer cannot be finished
    Rejected(ValidationError),
}

/// Mode, gesture and draw buffer of the editor.
#[derive(Debug, Clone)]
pub struct Interaction {
    mode: Mode,
    gesture: Gesture,
    draft: Vec<Point>,
    /// Screen pixels a canvas press may travel and still count as a click
    click_threshold: f64,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            gesture: Gesture::default(),
            draft: Vec::new(),
            click_threshold: DEFAULT_CLICK_THRESHOLD_PX,
        }
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the click/pan threshold in screen pixels.
    pub fn with_click_threshold(mut self, px: f64) -> Self {
        self.click_threshold = px;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Points collected in the current drawing mode.
    pub fn draft(&self) -> &[Point] {
        &self.draft
    }

    /// Switch modes. Leaving or entering any mode discards the draw buffer.
    ///
    /// A gesture still in progress is dropped; end it first with
    /// [`Interaction::interrupt`] or [`Interaction::abort_gesture`].
    pub fn set_mode(&mut self, mode: Mode) -> Action {
        self.draft.clear();
        self.gesture = Gesture::Idle;
        if self.mode != mode {
            log::info!("Mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
        Action::ModeChanged {
            interactive: !mode.is_drawing(),
        }
    }

    /// Button pressed at `image` (already mapped) with the dispatcher's hit.
    pub fn pointer_down(&mut self, screen: ScreenPoint, image: Point, hit: Option<Hit>) -> Action {
        match (self.mode, hit) {
            (Mode::Select, Some(hit)) => {
                log::debug!("Potential drag on {:?}", hit);
                self.gesture = Gesture::PotentialDrag { hit, last: screen };
                Action::BeginDrag
            }
            _ => {
                self.gesture = Gesture::Panning {
                    press: image,
                    origin: screen,
                    moved: false,
                };
                Action::BeginPan(screen)
            }
        }
    }

    /// Pointer moved. Drag deltas are measured through `mapper`; if it
    /// cannot map right now the sample is ignored.
    pub fn pointer_move(&mut self, screen: ScreenPoint, mapper: &CoordinateMapper<'_>) -> Action {
        match self.gesture {
            Gesture::Idle => Action::None,
            Gesture::PotentialDrag { hit, last } | Gesture::Dragging { hit, last, .. } => {
                let Ok(delta) = mapper.delta(last, screen) else {
                    return Action::None;
                };
                if delta.is_negligible(DRAG_EPSILON) {
                    return Action::None;
                }
                let total = match self.gesture {
                    Gesture::Dragging { total, .. } => total,
                    _ => {
                        log::debug!("Dragging {:?}", hit.drag_target());
                        Delta::default()
                    }
                };
                self.gesture = Gesture::Dragging {
                    hit,
                    last: screen,
                    total: Delta::new(total.dx + delta.dx, total.dy + delta.dy),
                };
                Action::Drag {
                    target: hit.drag_target(),
                    delta,
                }
            }
            Gesture::Panning {
                press,
                origin,
                moved,
            } => {
                if !moved {
                    let travel = (screen.x - origin.x).hypot(screen.y - origin.y);
                    if travel <= self.click_threshold {
                        return Action::None;
                    }
                    log::trace!("Press moved {:.1}px, panning", travel);
                }
                self.gesture = Gesture::Panning {
                    press,
                    origin,
                    moved: true,
                };
                Action::Pan(screen)
            }
        }
    }

    /// Button released. Decides between drag, click and pan outcomes.
    pub fn pointer_up(&mut self) -> Action {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Action::None,
            Gesture::Dragging { hit, .. } => Action::CommitDrag {
                target: hit.drag_target(),
            },
            Gesture::PotentialDrag { hit, .. } => Action::Click(hit),
            Gesture::Panning { moved: true, .. } => Action::EndPan,
            Gesture::Panning { press, .. } => match self.mode {
                Mode::Select => Action::ClickEmpty,
                Mode::AddRegion | Mode::AddLine => self.append_point(press),
            },
        }
    }

    /// Double-click finishes the shape in drawing modes.
    pub fn double_click(&mut self) -> Action {
        if self.mode.is_drawing() {
            self.finalize()
        } else {
            Action::None
        }
    }

    /// Add a point to the draw buffer. Repeats of the last point are dropped.
    pub fn append_point(&mut self, point: Point) -> Action {
        if !self.mode.is_drawing() {
            return Action::None;
        }
        if let Some(last) = self.draft.last() {
            if last.distance_to(&point) < DUPLICATE_POINT_EPSILON {
                return Action::None;
            }
        }
        log::trace!("Draw point ({:.1}, {:.1})", point.x, point.y);
        self.draft.push(point);
        Action::Redraw
    }

    /// Finish the current shape. On success the buffer is handed over and
    /// cleared; on failure it is kept so more points can be added.
    pub fn finalize(&mut self) -> Action {
        if !self.mode.is_drawing() {
            return Action::None;
        }
        let required = self.mode.min_points();
        if self.draft.len() < required {
            return Action::Rejected(ValidationError::too_few_points(required, self.draft.len()));
        }
        if !geometry::all_finite(&self.draft) {
            return Action::Rejected(ValidationError::invalid_coordinates(
                "draw point is not a finite number",
            ));
        }
        Action::Finalize {
            mode: self.mode,
            points: std::mem::take(&mut self.draft),
        }
    }

    /// End the gesture in progress because something else takes over (mode
    /// switch, page change). A drag that moved its target is committed.
    pub fn interrupt(&mut self) -> Action {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { hit, .. } => {
                log::debug!("Drag of {:?} interrupted, keeping it", hit.drag_target());
                Action::CommitDrag {
                    target: hit.drag_target(),
                }
            }
            Gesture::Panning { .. } => Action::EndPan,
            Gesture::Idle | Gesture::PotentialDrag { .. } => Action::None,
        }
    }

    /// Abort the gesture in progress (Escape). A drag is rolled back by
    /// moving its target by the opposite of everything applied so far.
    pub fn abort_gesture(&mut self) -> Action {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { hit, total, .. } => {
                log::debug!("Drag of {:?} aborted", hit.drag_target());
                Action::Drag {
                    target: hit.drag_target(),
                    delta: Delta::new(-total.dx, -total.dy),
                }
            }
            Gesture::Panning { .. } => Action::EndPan,
            Gesture::Idle | Gesture::PotentialDrag { .. } => Action::None,
        }
    }

    /// Discard the draw buffer. Like [`Interaction::set_mode`], this drops
    /// a gesture that was not ended first.
    pub fn cancel(&mut self) -> Action {
        self.gesture = Gesture::Idle;
        if self.draft.is_empty() {
            return Action::None;
        }
        self.draft.clear();
        Action::Redraw
    }

    /// Forget everything but the mode (page change).
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.draft.clear();
    }
}

/// Hit-test parameters, all in image units.
#[derive(Debug, Clone, Copy)]
pub struct HitParams {
    /// Distance that still counts as touching a line edge or baseline
    pub tolerance: f64,
    /// Vertex handle radius
    pub handle_radius: f64,
    pub show_regions: bool,
    pub show_lines: bool,
}

/// Find what `point` lands on: handles of the selection, then lines, then
/// regions, most recently added first within each group.
pub fn hit_test(scene: &SceneStore, point: Point, params: &HitParams) -> Option<Hit> {
    if let Some(handle) = hit_handle(scene, point, params) {
        return Some(Hit::Handle(handle));
    }

    if params.show_lines {
        for line in scene.lines().iter().rev() {
            if line.baseline.len() >= 2
                && geometry::near_polyline(point, &line.baseline, params.tolerance)
            {
                return Some(Hit::Line {
                    id: line.local,
                    baseline: true,
                });
            }
            if geometry::point_in_polygon(point, &line.points)
                || geometry::near_polygon_outline(point, &line.points, params.tolerance)
            {
                return Some(Hit::Line {
                    id: line.local,
                    baseline: false,
                });
            }
        }
    }

    if params.show_regions {
        for region in scene.regions().iter().rev() {
            if geometry::point_in_polygon(point, &region.points) {
                return Some(Hit::Region(region.local));
            }
        }
    }

    None
}

fn hit_handle(scene: &SceneStore, point: Point, params: &HitParams) -> Option<PointHandle> {
    let (shape, baseline) = scene.selection().shape()?;
    let points: &[Point] = match shape {
        ShapeRef::Region(id) if params.show_regions => &scene.region(id)?.points,
        ShapeRef::Line(id) if params.show_lines => scene.line(id)?.point_array(baseline),
        _ => return None,
    };

    // Nearest handle wins when several overlap
    points
        .iter()
        .enumerate()
        .map(|(index, p)| (index, p.distance_to(&point)))
        .filter(|(_, d)| *d <= params.handle_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| PointHandle {
            shape,
            index,
            baseline: baseline && matches!(shape, ShapeRef::Line(_)),
        })
}

/// Move a drag target inside the scene. Returns false (after logging) if
/// the target no longer exists.
pub fn apply_drag(scene: &mut SceneStore, target: DragTarget, delta: Delta) -> bool {
    match target {
        DragTarget::Point(handle) => {
            let point = match handle.shape {
                ShapeRef::Region(id) => scene
                    .region_mut(id)
                    .and_then(|r| r.points.get_mut(handle.index)),
                ShapeRef::Line(id) => scene
                    .line_mut(id)
                    .and_then(|l| l.point_array_mut(handle.baseline).get_mut(handle.index)),
            };
            match point {
                Some(p) => {
                    p.x += delta.dx;
                    p.y += delta.dy;
                    true
                }
                None => {
                    log::warn!("Drag target {:?} is out of range", handle);
                    false
                }
            }
        }
        DragTarget::Region(id) => match scene.region_mut(id) {
            Some(region) => {
                geometry::translate(&mut region.points, delta);
                true
            }
            None => {
                log::warn!("Dragged region {} no longer exists", id);
                false
            }
        },
        DragTarget::Line(id) => match scene.line_mut(id) {
            Some(line) => {
                geometry::translate(&mut line.points, delta);
                geometry::translate(&mut line.baseline, delta);
                true
            }
            None => {
                log::warn!("Dragged line {} no longer exists", id);
                false
            }
        },
    }
}
