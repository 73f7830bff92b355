//! Conversions between screen, viewport and image space.

use pagegt_view::{ScreenPoint, ViewTransform, ViewingSurface};

use crate::error::Unavailable;
use crate::geometry::Delta;
use crate::model::Point;

/// Maps pointer positions to image pixels through the surface's live transform.
///
/// Holds no state of its own: every call asks the surface, so pans and zooms
/// between two calls are always reflected.
pub struct CoordinateMapper<'a> {
    surface: &'a dyn ViewingSurface,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(surface: &'a dyn ViewingSurface) -> Self {
        Self { surface }
    }

    fn transform(&self) -> Result<ViewTransform, Unavailable> {
        self.surface
            .transform()
            .filter(|t| t.scale.is_finite() && t.scale > 0.0)
            .ok_or(Unavailable)
    }

    /// Screen position to image pixels.
    pub fn to_image_point(&self, screen: ScreenPoint) -> Result<Point, Unavailable> {
        Ok(self.transform()?.screen_to_image(screen))
    }

    /// Image pixels to screen position.
    pub fn to_screen_pixel(&self, image: Point) -> Result<ScreenPoint, Unavailable> {
        Ok(self.transform()?.image_to_screen(image))
    }

    /// Movement from `from` to `to` in image units.
    pub fn delta(&self, from: ScreenPoint, to: ScreenPoint) -> Result<Delta, Unavailable> {
        let t = self.transform()?;
        let a = t.screen_to_image(from);
        let b = t.screen_to_image(to);
        Ok(Delta::new(b.x - a.x, b.y - a.y))
    }

    /// Screen position in normalized viewport units (image width = 1.0).
    pub fn to_viewport_point(&self, screen: ScreenPoint) -> Result<Point, Unavailable> {
        let t = self.transform()?;
        Ok(t.image_to_viewport(t.screen_to_image(screen)))
    }

    /// A screen-pixel distance expressed in image pixels at the current zoom.
    pub fn image_units(&self, screen_px: f64) -> Result<f64, Unavailable> {
        Ok(screen_px / self.transform()?.scale)
    }

    /// Screen pixels per image pixel.
    pub fn scale(&self) -> Result<f64, Unavailable> {
        Ok(self.transform()?.scale)
    }
}
