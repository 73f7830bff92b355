//! Geometry helpers for hit-testing and containment.
//!
//! Pure functions over image-space points. Polygons are implicitly closed
//! (the last vertex connects back to the first).

use crate::model::{Point, Region};

/// Substitute for a zero vertical extent in the crossing test.
const HORIZONTAL_EPSILON: f64 = 1e-12;

/// A movement in image units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Both components are below `epsilon` in magnitude.
    pub fn is_negligible(&self, epsilon: f64) -> bool {
        self.dx.abs() < epsilon && self.dy.abs() < epsilon
    }
}

/// Check if a point is inside a polygon (ray casting algorithm).
///
/// Returns false for fewer than three vertices.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let vi = polygon[i];
        let vj = polygon[j];

        if (vi.y > point.y) != (vj.y > point.y) {
            let mut dy = vj.y - vi.y;
            if dy.abs() < HORIZONTAL_EPSILON {
                dy = HORIZONTAL_EPSILON.copysign(dy);
            }
            let x_cross = (vj.x - vi.x) * (point.y - vi.y) / dy + vi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Squared distance from `p` to the segment `a`-`b`.
///
/// A zero-length segment is treated as the point `a`.
pub fn distance_to_segment_squared(p: Point, a: Point, b: Point) -> f64 {
    let vx = b.x - a.x;
    let vy = b.y - a.y;
    let len_sq = vx * vx + vy * vy;

    if len_sq == 0.0 {
        let dx = p.x - a.x;
        let dy = p.y - a.y;
        return dx * dx + dy * dy;
    }

    let t = (((p.x - a.x) * vx + (p.y - a.y) * vy) / len_sq).clamp(0.0, 1.0);
    let dx = p.x - (a.x + t * vx);
    let dy = p.y - (a.y + t * vy);
    dx * dx + dy * dy
}

/// True if `p` lies within `tolerance` of any segment of the open polyline.
pub fn near_polyline(p: Point, points: &[Point], tolerance: f64) -> bool {
    let tol_sq = tolerance * tolerance;
    match points {
        [] => false,
        [only] => p.distance_to(only) <= tolerance,
        _ => points
            .windows(2)
            .any(|w| distance_to_segment_squared(p, w[0], w[1]) <= tol_sq),
    }
}

/// Like [`near_polyline`], but also tests the closing edge.
pub fn near_polygon_outline(p: Point, points: &[Point], tolerance: f64) -> bool {
    if near_polyline(p, points, tolerance) {
        return true;
    }
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 3 => {
            distance_to_segment_squared(p, *last, *first) <= tolerance * tolerance
        }
        _ => false,
    }
}

/// Polygon area via the shoelace formula (absolute value).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        twice += points[j].x * points[i].y - points[i].x * points[j].y;
        j = i;
    }
    (twice / 2.0).abs()
}

/// The smallest region whose polygon contains every point of `line_points`.
///
/// On equal areas the later region wins, matching hit-test precedence.
pub fn find_containing_region<'a>(
    line_points: &[Point],
    regions: impl IntoIterator<Item = &'a Region>,
) -> Option<&'a Region> {
    if line_points.is_empty() {
        return None;
    }

    let mut best: Option<(&Region, f64)> = None;
    for region in regions {
        if !region.is_drawable() {
            continue;
        }
        if !line_points
            .iter()
            .all(|p| point_in_polygon(*p, &region.points))
        {
            continue;
        }
        let area = polygon_area(&region.points);
        match best {
            Some((_, best_area)) if area > best_area => {}
            _ => best = Some((region, area)),
        }
    }
    best.map(|(region, _)| region)
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Grow by `padding` on every side. Negative padding is treated as zero.
    pub fn expand(&self, padding: f64) -> Rect {
        let pad = padding.max(0.0);
        Rect {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    /// The four corners, clockwise from top-left.
    pub fn to_polygon(&self) -> Vec<Point> {
        vec![
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Bounding box of a point set, `None` if empty.
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in &points[1..] {
        rect.min_x = rect.min_x.min(p.x);
        rect.min_y = rect.min_y.min(p.y);
        rect.max_x = rect.max_x.max(p.x);
        rect.max_y = rect.max_y.max(p.y);
    }
    Some(rect)
}

/// Move every point by `delta`.
pub fn translate(points: &mut [Point], delta: Delta) {
    for p in points {
        p.x += delta.dx;
        p.y += delta.dy;
    }
}

/// Every coordinate is finite.
pub fn all_finite(points: &[Point]) -> bool {
    points.iter().all(Point::is_finite)
}
