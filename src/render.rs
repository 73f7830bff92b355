//! Builds the overlay display list from the scene.

use pagegt_view::{Color, Overlay, OverlayItem, OverlayLayer, OverlayShape, Stroke};

use crate::interaction::Mode;
use crate::model::{Line, Point, Region, RegionType, Selection, ShapeRef};
use crate::scene::SceneStore;

const LINE_COLOR: Color = Color::rgb(0x00, 0xc8, 0x00);
const BASELINE_COLOR: Color = Color::rgb(0xff, 0x50, 0x50);
const SELECTED_COLOR: Color = Color::rgb(0xff, 0xeb, 0x3b);
const HANDLE_FILL: Color = Color::rgb(0xff, 0xff, 0xff);
const HANDLE_STROKE: Color = Color::rgb(0x21, 0x21, 0x21);
const DRAFT_COLOR: Color = Color::rgb(0xff, 0x00, 0xff);

/// Stroke width multiplier for selected shapes.
const SELECTED_WIDTH_FACTOR: f64 = 2.0;

/// Drawing style for a region type. Unknown types get a neutral gray.
pub fn style_for_region(kind: &RegionType) -> Stroke {
    let (hex, fill_opacity, width, dash) = match kind {
        RegionType::Text => (0x0080ff, 0.20, 1.0, None),
        RegionType::Table => (0xffa500, 0.18, 1.2, Some("4 3")),
        RegionType::Image => (0x7c4dff, 0.15, 1.0, None),
        RegionType::Separator => (0x00bcd4, 0.15, 1.0, Some("2 3")),
        RegionType::Maths => (0xe91e63, 0.18, 1.0, None),
        RegionType::Heading => (0x4caf50, 0.18, 1.0, None),
        RegionType::Graphic | RegionType::Other(_) => (0x999999, 0.12, 1.0, None),
    };
    let color = hex_color(hex);
    Stroke {
        fill: Some(color),
        fill_opacity,
        color,
        opacity: 0.9,
        width,
        dash,
    }
}

fn hex_color(hex: u32) -> Color {
    Color::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn line_style() -> Stroke {
    Stroke {
        fill: Some(LINE_COLOR),
        fill_opacity: 0.15,
        color: LINE_COLOR,
        opacity: 0.9,
        width: 1.0,
        dash: None,
    }
}

fn baseline_style() -> Stroke {
    Stroke {
        fill: None,
        fill_opacity: 0.0,
        color: BASELINE_COLOR,
        opacity: 0.9,
        width: 1.5,
        dash: None,
    }
}

fn highlight(mut stroke: Stroke) -> Stroke {
    stroke.color = SELECTED_COLOR;
    stroke.opacity = 1.0;
    stroke.width *= SELECTED_WIDTH_FACTOR;
    stroke
}

/// Everything besides the scene that affects a frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Current interaction mode
    pub mode: Mode,
    /// Points collected so far in a drawing mode
    pub draft: &'a [Point],
    /// Screen pixels per image pixel
    pub scale: f64,
    pub show_regions: bool,
    pub show_lines: bool,
}

/// Turns a [`SceneStore`] into an [`Overlay`].
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    /// Handle radius in screen pixels
    handle_radius_px: f64,
}

impl OverlayRenderer {
    pub fn new(handle_radius_px: f64) -> Self {
        Self { handle_radius_px }
    }

    /// Render one frame. The result depends only on the arguments.
    pub fn render(&self, scene: &SceneStore, frame: &RenderFrame<'_>) -> Overlay {
        let mut overlay = Overlay::new();
        let selection = scene.selection();

        if frame.show_regions {
            for region in scene.regions() {
                if let Some(item) = region_item(region, &selection) {
                    overlay.push(item);
                }
            }
        }

        if frame.show_lines {
            for line in scene.lines() {
                push_line_items(&mut overlay, line, &selection);
            }
        }

        self.push_handles(&mut overlay, scene, frame, &selection);

        if frame.mode.is_drawing() && !frame.draft.is_empty() {
            overlay.push(OverlayItem::new(
                OverlayShape::Polyline {
                    vertices: frame.draft.to_vec(),
                },
                Stroke {
                    fill: None,
                    fill_opacity: 0.0,
                    color: DRAFT_COLOR,
                    opacity: 1.0,
                    width: 1.5 / frame.scale.max(f64::EPSILON),
                    dash: Some("4 2"),
                },
                OverlayLayer::Editing,
                "draft",
            ));
        }

        overlay
    }

    fn push_handles(
        &self,
        overlay: &mut Overlay,
        scene: &SceneStore,
        frame: &RenderFrame<'_>,
        selection: &Selection,
    ) {
        let Some((shape, baseline)) = selection.shape() else {
            return;
        };
        let points: &[Point] = match shape {
            ShapeRef::Region(id) if frame.show_regions => match scene.region(id) {
                Some(region) => &region.points,
                None => return,
            },
            ShapeRef::Line(id) if frame.show_lines => match scene.line(id) {
                Some(line) => line.point_array(baseline),
                None => return,
            },
            _ => return,
        };

        let radius = self.handle_radius_px / frame.scale.max(f64::EPSILON);
        let active = match selection {
            Selection::Point(handle) => Some(handle.index),
            _ => None,
        };
        for (index, center) in points.iter().enumerate() {
            overlay.push(
                OverlayItem::new(
                    OverlayShape::Handle {
                        center: *center,
                        radius,
                    },
                    Stroke {
                        fill: Some(HANDLE_FILL),
                        fill_opacity: 1.0,
                        color: HANDLE_STROKE,
                        opacity: 1.0,
                        width: 1.0 / frame.scale.max(f64::EPSILON),
                        dash: None,
                    },
                    OverlayLayer::Editing,
                    "handle",
                )
                .key(format!("handle:{index}"))
                .selected(active == Some(index)),
            );
        }
    }
}

fn region_item(region: &Region, selection: &Selection) -> Option<OverlayItem> {
    if !region.is_drawable() {
        return None;
    }
    let selected = selection.region() == Some(region.local);
    let style = style_for_region(&region.kind);
    Some(
        OverlayItem::new(
            OverlayShape::Polygon {
                vertices: region.points.clone(),
            },
            if selected { highlight(style) } else { style },
            OverlayLayer::Regions,
            "region",
        )
        .title(region.kind.name())
        .key(format!("region:{}", region.local.0))
        .selected(selected),
    )
}

fn push_line_items(overlay: &mut Overlay, line: &Line, selection: &Selection) {
    let selected = selection.line() == Some(line.local);

    if line.points.len() >= 2 {
        let style = line_style();
        let mut item = OverlayItem::new(
            OverlayShape::Polygon {
                vertices: line.points.clone(),
            },
            if selected { highlight(style) } else { style },
            OverlayLayer::Lines,
            "line",
        )
        .key(format!("line:{}", line.local.0))
        .selected(selected);
        if let Some(title) = line.title() {
            item = item.title(title);
        }
        overlay.push(item);
    }

    if line.baseline.len() >= 2 {
        let style = baseline_style();
        let mut item = OverlayItem::new(
            OverlayShape::Polyline {
                vertices: line.baseline.clone(),
            },
            if selected { highlight(style) } else { style },
            OverlayLayer::Lines,
            "base",
        )
        .key(format!("base:{}", line.local.0))
        .selected(selected);
        if let Some(title) = line.title() {
            item = item.title(title);
        }
        overlay.push(item);
    }
}
