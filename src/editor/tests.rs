//! Editing scenarios driven through the public event API against a recording
//! page service. The view is 1000x1000 showing a 1000x1000 page, so screen
//! and image coordinates coincide until the view is zoomed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagegt_view::{Bounds, InputEvent, KeyCode, MouseButton, OverlayShape, ScreenPoint};

use super::*;
use crate::gateway::{LineDto, RegionDto};
use crate::geometry::Rect;
use crate::test_support::{line_dto, page_data, rect, region_dto, Call, RecordingService};

const WAIT: Duration = Duration::from_secs(5);

struct Fixture {
    editor: Editor,
    service: RecordingService,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Fixture {
    fn open(regions: Vec<RegionDto>, lines: Vec<LineDto>) -> Self {
        let service = RecordingService::new().with_page(page_data(regions, lines));
        let calls = service.calls();
        let mut editor =
            Editor::new(&EditorConfig::default(), service.clone(), RetainedOverlay::new()).unwrap();
        editor.set_view_bounds(Bounds::new(0.0, 0.0, 1000.0, 1000.0));
        editor.open_page(page());
        let effects = editor.wait_for_saves(WAIT);
        assert!(
            matches!(effects.last(), Some(Effect::PageLoaded(_))),
            "page did not load: {effects:?}"
        );
        calls.lock().unwrap().clear();
        Self {
            editor,
            service,
            calls,
        }
    }

    /// One text region R1 (id `r1`) with the given lines.
    fn with_r1(lines: Vec<LineDto>) -> Self {
        Self::open(vec![region_dto("r1", RegionType::Text, r1())], lines)
    }

    fn press(&mut self, x: f64, y: f64) -> Vec<Effect> {
        self.editor.handle_event(InputEvent::PointerDown {
            button: MouseButton::Left,
            position: ScreenPoint::new(x, y),
        })
    }

    fn move_to(&mut self, x: f64, y: f64) -> Vec<Effect> {
        self.editor.handle_event(InputEvent::PointerMove {
            position: ScreenPoint::new(x, y),
        })
    }

    fn release(&mut self, x: f64, y: f64) -> Vec<Effect> {
        self.editor.handle_event(InputEvent::PointerUp {
            button: MouseButton::Left,
            position: ScreenPoint::new(x, y),
        })
    }

    fn click(&mut self, x: f64, y: f64) -> Vec<Effect> {
        let mut effects = self.press(x, y);
        effects.extend(self.release(x, y));
        effects
    }

    fn drag(&mut self, from: (f64, f64), to: (f64, f64)) -> Vec<Effect> {
        let mut effects = self.press(from.0, from.1);
        effects.extend(self.move_to(to.0, to.1));
        effects.extend(self.release(to.0, to.1));
        effects
    }

    fn key(&mut self, key: KeyCode) -> Vec<Effect> {
        self.editor.handle_event(InputEvent::KeyPressed { key })
    }

    fn draw_line(&mut self, a: (f64, f64), b: (f64, f64)) -> Vec<Effect> {
        self.key(KeyCode::L);
        let mut effects = self.click(a.0, a.1);
        effects.extend(self.click(b.0, b.1));
        effects.extend(self.key(KeyCode::Enter));
        effects
    }

    fn settle(&mut self) -> Vec<Effect> {
        self.editor.wait_for_saves(WAIT)
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn region(&self, id: &str) -> &Region {
        self.editor.scene().get_region(id).unwrap()
    }
}

fn page() -> PageRef {
    PageRef::new("ws-1", "OCR-D-SEG/page_0001.xml")
}

fn r1() -> Vec<Point> {
    rect(100.0, 100.0, 600.0, 400.0)
}

fn l1() -> LineDto {
    line_dto("l1", "r1", rect(150.0, 140.0, 400.0, 170.0), "Ein Satz")
}

fn l2() -> LineDto {
    line_dto("l2", "r1", rect(150.0, 240.0, 400.0, 270.0), "")
}

fn notices(effects: &[Effect]) -> Vec<&Notice> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Notify(notice) => Some(notice),
            _ => None,
        })
        .collect()
}

#[test]
fn line_inside_region_is_saved_with_its_owner() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.draw_line((150.0, 150.0), (400.0, 150.0));
    fx.settle();

    let calls = fx.calls();
    assert_eq!(calls.len(), 1, "{calls:?}");
    match &calls[0] {
        Call::SaveLine(dto) => {
            assert_eq!(dto.id, None);
            assert_eq!(dto.region_id, "r1");
            assert_eq!(dto.points, vec![Point::new(150.0, 150.0), Point::new(400.0, 150.0)]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let line = fx.editor.scene().get_line("line-1").unwrap();
    assert_eq!(line.region, fx.region("r1").local);
    assert_eq!(fx.editor.scene().selection().line(), Some(line.local));
    assert_eq!(fx.editor.mode(), Mode::AddLine);
}

#[test]
fn empty_click_clears_selection_without_calls() {
    let mut fx = Fixture::with_r1(vec![l1()]);

    let effects = fx.click(200.0, 155.0);
    let line = fx.editor.scene().get_line("l1").unwrap().local;
    assert_eq!(
        effects,
        vec![Effect::OpenTextEditor {
            line,
            text: "Ein Satz".to_string()
        }]
    );

    let effects = fx.click(800.0, 800.0);
    assert_eq!(effects, vec![Effect::CloseTextEditor]);
    assert!(fx.editor.scene().selection().is_none());
    assert!(fx.editor.popover().is_none());
    fx.settle();
    assert!(fx.calls().is_empty());
}

#[test]
fn handle_drag_saves_region_once() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.click(300.0, 300.0);
    assert_eq!(fx.editor.scene().selection().region(), Some(fx.region("r1").local));

    fx.press(100.0, 100.0);
    assert!(fx.editor.viewer().is_pan_locked());
    fx.move_to(105.0, 98.0);
    fx.move_to(110.0, 95.0);
    fx.release(110.0, 95.0);
    assert!(!fx.editor.viewer().is_pan_locked());
    fx.settle();

    let mut expected = r1();
    expected[0] = Point::new(110.0, 95.0);
    assert_eq!(
        fx.calls(),
        vec![Call::SaveRegion(RegionDto {
            id: Some("r1".to_string()),
            kind: RegionType::Text,
            points: expected.clone(),
            conf: None,
        })]
    );
    assert_eq!(fx.region("r1").points, expected);
}

#[test]
fn body_drag_moves_every_point_and_saves_once() {
    let mut fx = Fixture::with_r1(vec![l1()]);
    fx.press(300.0, 300.0);
    for step in 1..=5 {
        fx.move_to(300.0 + f64::from(step) * 2.0, 300.0);
    }
    fx.release(310.0, 300.0);
    fx.settle();

    assert_eq!(fx.calls().len(), 1);
    assert_eq!(fx.region("r1").points[0], Point::new(110.0, 100.0));
    // lines stay put when their region moves
    assert_eq!(
        fx.editor.scene().get_line("l1").unwrap().points[0],
        Point::new(150.0, 140.0)
    );
}

#[test]
fn press_without_movement_is_a_click_not_a_save() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.press(300.0, 300.0);
    fx.move_to(300.0, 300.0);
    fx.release(300.0, 300.0);
    fx.settle();

    assert!(fx.calls().is_empty());
    assert_eq!(fx.editor.scene().selection().region(), Some(fx.region("r1").local));
    assert_eq!(fx.region("r1").points, r1());
}

#[test]
fn drag_there_and_back_restores_geometry() {
    let mut fx = Fixture::with_r1(vec![l1()]);
    let before = fx.editor.scene().get_line("l1").unwrap().points.clone();
    fx.press(200.0, 155.0);
    fx.move_to(260.0, 120.0);
    fx.move_to(200.0, 155.0);
    fx.release(200.0, 155.0);
    fx.settle();

    assert_eq!(fx.editor.scene().get_line("l1").unwrap().points, before);
    // it moved, so it is still saved exactly once
    assert_eq!(fx.calls().len(), 1);
}

#[test]
fn deleting_region_cascades_to_its_lines() {
    let mut fx = Fixture::with_r1(vec![l1(), l2()]);
    fx.click(500.0, 350.0);
    fx.key(KeyCode::Delete);
    fx.settle();

    assert_eq!(
        fx.calls(),
        vec![
            Call::DeleteLine("l1".to_string()),
            Call::DeleteLine("l2".to_string()),
            Call::DeleteRegion("r1".to_string()),
        ]
    );
    assert!(fx.editor.scene().is_empty());
    let overlay = fx.editor.overlay().overlay();
    assert_eq!(overlay.items_of_class("region").count(), 0);
    assert_eq!(overlay.items_of_class("line").count(), 0);
}

#[test]
fn delete_prefers_the_selected_line() {
    let mut fx = Fixture::with_r1(vec![l1(), l2()]);
    fx.click(200.0, 155.0);
    let effects = fx.key(KeyCode::Backspace);
    assert_eq!(effects, vec![Effect::CloseTextEditor]);
    fx.settle();

    assert_eq!(fx.calls(), vec![Call::DeleteLine("l1".to_string())]);
    assert_eq!(fx.editor.scene().lines().len(), 1);
    assert_eq!(fx.editor.scene().regions().len(), 1);
}

#[test]
fn new_line_goes_to_smallest_containing_region() {
    let mut fx = Fixture::open(
        vec![
            region_dto("big", RegionType::Text, rect(100.0, 100.0, 600.0, 400.0)),
            region_dto("small", RegionType::Text, rect(120.0, 120.0, 450.0, 200.0)),
        ],
        vec![],
    );
    fx.draw_line((150.0, 150.0), (400.0, 150.0));
    fx.settle();

    match fx.calls().as_slice() {
        [Call::SaveLine(dto)] => assert_eq!(dto.region_id, "small"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn uncontained_line_gets_one_new_region() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.draw_line((700.0, 700.0), (800.0, 700.0));
    fx.settle();

    let expected = Rect {
        min_x: 650.0,
        min_y: 650.0,
        max_x: 850.0,
        max_y: 750.0,
    }
    .to_polygon();
    let calls = fx.calls();
    assert_eq!(calls.len(), 2, "{calls:?}");
    match &calls[0] {
        Call::SaveRegion(dto) => {
            assert_eq!(dto.id, None);
            assert_eq!(dto.points, expected);
        }
        other => panic!("unexpected {other:?}"),
    }
    match &calls[1] {
        Call::SaveLine(dto) => assert_eq!(dto.region_id, "region-1"),
        other => panic!("unexpected {other:?}"),
    }

    let region = fx.region("region-1");
    assert_eq!(region.points, expected);
    let line = fx.editor.scene().get_line("line-1").unwrap();
    assert_eq!(line.region, region.local);
}

#[test]
fn selected_region_owns_new_line() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.click(300.0, 300.0);
    fx.draw_line((700.0, 700.0), (800.0, 700.0));
    fx.settle();

    match fx.calls().as_slice() {
        [Call::SaveLine(dto)] => assert_eq!(dto.region_id, "r1"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn region_needs_three_points() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.key(KeyCode::R);
    assert!(!fx.editor.overlay().is_interactive());
    fx.click(700.0, 500.0);
    fx.click(900.0, 500.0);

    let effects = fx.key(KeyCode::Enter);
    let notes = notices(&effects);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NoticeLevel::Error);
    assert_eq!(notes[0].message, "add at least 3 points");
    assert_eq!(fx.editor.draft().len(), 2);

    // a double-click adds its point once and finishes
    fx.click(900.0, 700.0);
    fx.click(900.0, 700.0);
    fx.editor.handle_event(InputEvent::DoubleClick {
        position: ScreenPoint::new(900.0, 700.0),
    });
    fx.settle();

    match fx.calls().as_slice() {
        [Call::SaveRegion(dto)] => {
            assert_eq!(dto.points.len(), 3);
            assert_eq!(dto.kind, RegionType::Text);
        }
        other => panic!("unexpected {other:?}"),
    }
    let region = fx.region("region-1");
    assert_eq!(fx.editor.scene().selection(), Selection::Region(region.local));
    assert!(fx.editor.draft().is_empty());
    assert_eq!(fx.editor.mode(), Mode::AddRegion);
}

#[test]
fn escape_discards_draft() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.key(KeyCode::L);
    fx.click(700.0, 500.0);
    assert_eq!(
        fx.editor.overlay().overlay().items_of_class("draft").count(),
        1
    );
    fx.key(KeyCode::Escape);
    assert!(fx.editor.draft().is_empty());
    assert_eq!(
        fx.editor.overlay().overlay().items_of_class("draft").count(),
        0
    );

    fx.key(KeyCode::S);
    assert!(fx.editor.overlay().is_interactive());
    assert!(fx.calls().is_empty());
}

#[test]
fn drawing_press_and_drag_pans_instead_of_adding_points() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.key(KeyCode::L);
    fx.drag((500.0, 500.0), (560.0, 500.0));
    assert!(fx.editor.draft().is_empty());
    assert_eq!(fx.editor.viewer().pan, (60.0, 0.0));
}

#[test]
fn jittery_click_in_drawing_mode_adds_the_point() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.key(KeyCode::L);
    fx.press(150.0, 150.0);
    fx.move_to(150.5, 150.0);
    fx.release(150.5, 150.0);
    assert_eq!(fx.editor.draft(), &[Point::new(150.0, 150.0)]);
    assert_eq!(fx.editor.viewer().pan, (0.0, 0.0));
}

#[test]
fn jittery_click_on_empty_canvas_clears_selection() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.click(300.0, 300.0);
    assert!(fx.editor.scene().selection().region().is_some());

    fx.press(800.0, 800.0);
    fx.move_to(801.0, 801.0);
    fx.release(801.0, 801.0);
    assert!(fx.editor.scene().selection().is_none());
    assert_eq!(fx.editor.viewer().pan, (0.0, 0.0));
}

#[test]
fn mode_switch_mid_drag_saves_the_moved_region() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.press(300.0, 300.0);
    fx.move_to(320.0, 300.0);
    fx.key(KeyCode::R);
    assert!(!fx.editor.viewer().is_pan_locked());
    fx.release(320.0, 300.0);
    fx.settle();

    assert_eq!(fx.editor.mode(), Mode::AddRegion);
    assert!(fx.editor.draft().is_empty());
    assert_eq!(fx.region("r1").points[0], Point::new(120.0, 100.0));
    match fx.calls().as_slice() {
        [Call::SaveRegion(dto)] => assert_eq!(dto.points[0], Point::new(120.0, 100.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn escape_mid_drag_puts_the_region_back() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.press(300.0, 300.0);
    fx.move_to(310.0, 305.0);
    fx.move_to(320.0, 300.0);
    fx.key(KeyCode::Escape);
    assert!(!fx.editor.viewer().is_pan_locked());
    fx.move_to(340.0, 300.0);
    fx.release(340.0, 300.0);
    fx.settle();

    assert_eq!(fx.region("r1").points, r1());
    assert!(fx.calls().is_empty());
}

#[test]
fn opening_another_page_mid_drag_saves_the_drag_first() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.press(300.0, 300.0);
    fx.move_to(320.0, 300.0);
    let other = PageRef::new("ws-1", "OCR-D-SEG/page_0002.xml");
    fx.editor.open_page(other.clone());
    fx.release(320.0, 300.0);
    fx.settle();

    match fx.calls().as_slice() {
        [Call::SaveRegion(dto), Call::LoadPage(loaded)] => {
            assert_eq!(dto.id.as_deref(), Some("r1"));
            assert_eq!(dto.points[0], Point::new(120.0, 100.0));
            assert_eq!(loaded, &other);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn reset_during_a_press_makes_no_call() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.press(300.0, 300.0);
    fx.editor.reset();
    fx.release(300.0, 300.0);
    fx.settle();

    assert!(fx.calls().is_empty());
    assert!(!fx.editor.viewer().is_pan_locked());
    assert!(fx.editor.page().is_none());
}

#[test]
fn partial_save_reply_keeps_local_fields() {
    let mut line = l1();
    line.baseline = vec![Point::new(150.0, 165.0), Point::new(400.0, 165.0)];
    let mut fx = Fixture::open(vec![region_dto("r1", RegionType::Table, r1())], vec![line]);
    let region = fx.region("r1").local;
    let line = fx.editor.scene().get_line("l1").unwrap().local;

    fx.editor.apply_completion(Completion {
        seq: 1,
        page: page(),
        op: OpKind::SaveLine(line),
        result: Ok(Outcome::Line(serde_json::from_str(r#"{"id": "l1"}"#).unwrap())),
    });
    fx.editor.apply_completion(Completion {
        seq: 2,
        page: page(),
        op: OpKind::SaveRegion(region),
        result: Ok(Outcome::Region(serde_json::from_str(r#"{"id": "r1"}"#).unwrap())),
    });

    let l = fx.editor.scene().get_line("l1").unwrap();
    assert_eq!(l.text, "Ein Satz");
    assert_eq!(l.points, rect(150.0, 140.0, 400.0, 170.0));
    assert_eq!(l.baseline.len(), 2);
    assert_eq!(fx.region("r1").kind, RegionType::Table);
    assert_eq!(fx.region("r1").points, r1());
}

#[test]
fn committed_text_is_saved_with_the_line() {
    let mut fx = Fixture::with_r1(vec![l1()]);
    fx.click(200.0, 155.0);
    let effects = fx.editor.commit_line_text("Eine Zeile");
    assert_eq!(effects, vec![Effect::CloseTextEditor]);
    fx.settle();

    match fx.calls().as_slice() {
        [Call::SaveLine(dto)] => {
            assert_eq!(dto.id.as_deref(), Some("l1"));
            assert_eq!(dto.region_id, "r1");
            assert_eq!(dto.text, "Eine Zeile");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(fx.editor.scene().get_line("l1").unwrap().text, "Eine Zeile");
}

#[test]
fn failed_save_keeps_local_state_and_reports() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.service.fail_next(GatewayError::http(500, "disk full"));
    fx.drag((300.0, 300.0), (320.0, 300.0));
    let effects = fx.settle();

    let notes = notices(&effects);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NoticeLevel::Error);
    assert!(notes[0].message.contains("500"), "{}", notes[0].message);
    assert!(notes[0].message.contains("disk full"), "{}", notes[0].message);
    assert_eq!(fx.region("r1").points[0], Point::new(120.0, 100.0));
}

#[test]
fn stale_save_result_does_not_overwrite_newer_geometry() {
    let mut fx = Fixture::with_r1(vec![]);
    let local = fx.region("r1").local;
    fx.drag((300.0, 300.0), (320.0, 300.0));

    // an older response arriving after the drag above was issued
    fx.editor.apply_completion(Completion {
        seq: 0,
        page: page(),
        op: OpKind::SaveRegion(local),
        result: Ok(Outcome::Region(
            region_dto("r1", RegionType::Text, rect(0.0, 0.0, 10.0, 10.0)).into(),
        )),
    });
    assert_eq!(fx.region("r1").points[0], Point::new(120.0, 100.0));

    fx.settle();
    assert_eq!(fx.region("r1").points[0], Point::new(120.0, 100.0));
}

#[test]
fn result_for_another_page_is_ignored() {
    let mut fx = Fixture::with_r1(vec![]);
    let local = fx.region("r1").local;
    let effects = fx.editor.apply_completion(Completion {
        seq: 99,
        page: PageRef::new("ws-1", "other.xml"),
        op: OpKind::SaveRegion(local),
        result: Err(GatewayError::http(500, "boom")),
    });
    assert!(effects.is_empty());
}

#[test]
fn orphan_lines_are_dropped_on_load() {
    let fx = Fixture::with_r1(vec![l1(), line_dto("lx", "missing", rect(0.0, 0.0, 5.0, 5.0), "")]);
    let stats = fx.editor.scene().stats();
    assert_eq!(stats.regions_total, 1);
    assert_eq!(stats.lines_total, 1);
    assert!(fx.editor.scene().get_line("lx").is_none());
}

#[test]
fn hidden_lines_cannot_be_hit() {
    let mut fx = Fixture::with_r1(vec![l1()]);
    fx.click(200.0, 155.0);
    let effects = fx.key(KeyCode::Key2);
    assert_eq!(effects, vec![Effect::CloseTextEditor]);
    assert!(fx.editor.scene().selection().is_none());
    assert_eq!(fx.editor.layer_visibility(), (true, false));
    assert_eq!(fx.editor.overlay().overlay().items_of_class("line").count(), 0);

    fx.click(200.0, 155.0);
    assert_eq!(fx.editor.scene().selection().region(), Some(fx.region("r1").local));
}

#[test]
fn handles_keep_their_screen_size_when_zooming() {
    let mut fx = Fixture::with_r1(vec![]);
    fx.click(300.0, 300.0);
    let radius = |fx: &Fixture| {
        fx.editor
            .overlay()
            .overlay()
            .items_of_class("handle")
            .map(|item| match item.shape {
                OverlayShape::Handle { radius, .. } => radius,
                _ => panic!("handle is not a circle"),
            })
            .next()
            .unwrap()
    };
    assert!((radius(&fx) - 5.0).abs() < 1e-9);

    fx.key(KeyCode::Plus);
    let scale = CoordinateMapper::new(fx.editor.viewer()).scale().unwrap();
    assert!(scale > 1.0);
    assert!((radius(&fx) - 5.0 / scale).abs() < 1e-9);
}

#[test]
fn overlay_is_anchored_on_load_and_resize() {
    let mut fx = Fixture::with_r1(vec![]);
    assert_eq!(fx.editor.overlay().anchor_count(), 1);
    fx.editor.set_view_bounds(Bounds::new(0.0, 0.0, 1000.0, 1000.0));
    assert_eq!(fx.editor.overlay().anchor_count(), 1);

    fx.editor.set_view_bounds(Bounds::new(0.0, 0.0, 500.0, 800.0));
    assert_eq!(fx.editor.overlay().anchor_count(), 2);
    let anchor = fx.editor.overlay().anchor_bounds().unwrap();
    assert_eq!(anchor.image_width, 1000.0);
    assert_eq!(anchor.screen.width, 500.0);
}

#[test]
fn suggestion_fills_the_open_popover() {
    let mut fx = Fixture::with_r1(vec![l1()]);
    fx.click(200.0, 155.0);
    assert!(fx.editor.suggest_transcription().is_empty());
    let effects = fx.settle();

    let line = fx.editor.scene().get_line("l1").unwrap().local;
    assert_eq!(
        effects,
        vec![Effect::SuggestionReady {
            line,
            text: "suggested for l1".to_string()
        }]
    );
    assert_eq!(fx.editor.popover().unwrap().text, "suggested for l1");
    match fx.calls().as_slice() {
        [Call::Suggest(request)] => {
            assert_eq!(request.existing_text, "Ein Satz");
            assert_eq!(request.language, "German");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn transcriptions_are_saved_in_one_request() {
    let mut fx = Fixture::with_r1(vec![l1(), l2()]);
    fx.editor.save_transcriptions();
    let effects = fx.settle();

    assert_eq!(notices(&effects)[0].message, "saved 2 transcriptions");
    match fx.calls().as_slice() {
        [Call::SaveTranscription(updates)] => {
            assert_eq!(updates.len(), 2);
            assert_eq!(updates[0].text, "Ein Satz");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn events_before_a_page_loads_are_ignored() {
    let service = RecordingService::new();
    let calls = service.calls();
    let mut editor = Editor::new(&EditorConfig::default(), service, RetainedOverlay::new()).unwrap();
    editor.set_view_bounds(Bounds::new(0.0, 0.0, 1000.0, 1000.0));

    let press = InputEvent::PointerDown {
        button: MouseButton::Left,
        position: ScreenPoint::new(10.0, 10.0),
    };
    assert!(editor.handle_event(press).is_empty());
    assert!(editor.delete_selection().is_empty());
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn failed_load_is_reported() {
    let service = RecordingService::new();
    let mut editor = Editor::new(&EditorConfig::default(), service, RetainedOverlay::new()).unwrap();
    editor.open_page(page());
    let effects = editor.wait_for_saves(WAIT);

    let notes = notices(&effects);
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.contains("404"));
    assert!(!editor.is_loading());
    assert!(editor.image().is_none());
}
