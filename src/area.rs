//! Drawing areas: coordinate-mapped rectangular regions of a device.
//!
//! A drawing area maps a data-space rectangle (the data limits) onto a
//! device-space rectangle (the draw limits) with one affine map per axis.
//! The map extrapolates; nothing is clamped. Primitive draw calls take
//! already-device-mapped coordinates — mapping from data space is an
//! explicit, separate step callers invoke through `to_device*`.

use crate::color::GrColor;
use crate::device::AreaId;
use crate::types::{GrPoint, Limits, interpolate};

/// Current pen and text state for one drawing area.
#[derive(Clone, Debug)]
pub struct PenState {
    pub color: GrColor,
    pub line_width: f64,
    /// Alternating on/off run lengths in device units; `None` is solid.
    pub dash: Option<Vec<f64>>,
    pub font: String,
    pub font_size: f64,
}

impl Default for PenState {
    fn default() -> Self {
        PenState {
            color: GrColor::BLACK,
            line_width: 1.0,
            dash: None,
            font: "helvetica".to_string(),
            font_size: 10.0,
        }
    }
}

/// A rectangular sub-region of a device with its own data-space transform.
#[derive(Clone, Debug)]
pub struct DrawingArea {
    name: String,
    draw_limits: Limits,
    data_limits: Limits,
    pub(crate) pen: PenState,
    pub(crate) clip: Option<Limits>,
    /// Back-reference to the owning device: the slot this area occupies.
    /// Non-owning; `None` until the area is added to a device.
    pub(crate) slot: Option<AreaId>,
}

impl DrawingArea {
    pub fn new(name: impl Into<String>, draw_limits: Limits, data_limits: Limits) -> Self {
        DrawingArea {
            name: name.into(),
            draw_limits,
            data_limits,
            pen: PenState::default(),
            clip: None,
            slot: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn draw_limits(&self) -> Limits {
        self.draw_limits
    }

    pub fn data_limits(&self) -> Limits {
        self.data_limits
    }

    pub fn set_draw_limits(&mut self, limits: Limits) {
        self.draw_limits = limits;
    }

    pub fn set_data_limits(&mut self, limits: Limits) {
        self.data_limits = limits;
    }

    /// The device slot this area occupies, once added to a device.
    pub fn slot(&self) -> Option<AreaId> {
        self.slot
    }

    // ==================== coordinate mapping ====================

    pub fn to_device_x(&self, x: f64) -> f64 {
        interpolate(
            x,
            self.data_limits.xmin,
            self.data_limits.xmax,
            self.draw_limits.xmin,
            self.draw_limits.xmax,
        )
    }

    pub fn to_device_y(&self, y: f64) -> f64 {
        interpolate(
            y,
            self.data_limits.ymin,
            self.data_limits.ymax,
            self.draw_limits.ymin,
            self.draw_limits.ymax,
        )
    }

    pub fn to_device(&self, p: GrPoint) -> GrPoint {
        GrPoint::new(self.to_device_x(p.x), self.to_device_y(p.y))
    }

    /// Inverse map from device coordinates back into data space, used for
    /// hit-testing pointer positions.
    pub fn data_xy(&self, devx: f64, devy: f64) -> (f64, f64) {
        (
            interpolate(
                devx,
                self.draw_limits.xmin,
                self.draw_limits.xmax,
                self.data_limits.xmin,
                self.data_limits.xmax,
            ),
            interpolate(
                devy,
                self.draw_limits.ymin,
                self.draw_limits.ymax,
                self.data_limits.ymin,
                self.data_limits.ymax,
            ),
        )
    }

    /// Map a point array from data space into device space.
    ///
    /// The mapped coordinates are written back into `pts` in place; the
    /// returned vector is freshly allocated and left at its default
    /// values. Callers have historically relied on the in-place update.
    pub fn map_points(&self, pts: &mut [GrPoint]) -> Vec<GrPoint> {
        let out = vec![GrPoint::default(); pts.len()];
        for p in pts.iter_mut() {
            p.x = self.to_device_x(p.x);
            p.y = self.to_device_y(p.y);
        }
        out
    }

    // ==================== pen state ====================

    pub fn set_color(&mut self, color: GrColor) {
        self.pen.color = color;
    }

    pub fn color(&self) -> GrColor {
        self.pen.color
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.pen.line_width = width;
    }

    pub fn set_dash(&mut self, dash: Option<Vec<f64>>) {
        self.pen.dash = dash;
    }

    pub fn set_font(&mut self, name: impl Into<String>, size: f64) {
        self.pen.font = name.into();
        self.pen.font_size = size;
    }

    pub fn set_clip(&mut self, clip: Option<Limits>) {
        self.clip = clip;
    }

    pub fn clip(&self) -> Option<Limits> {
        self.clip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> DrawingArea {
        DrawingArea::new(
            "plot",
            Limits::new(100.0, 50.0, 300.0, 250.0),
            Limits::new(0.0, 0.0, 10.0, 20.0),
        )
    }

    #[test]
    fn data_to_device_mapping() {
        let a = area();
        assert_eq!(a.to_device_x(0.0), 100.0);
        assert_eq!(a.to_device_x(10.0), 300.0);
        assert_eq!(a.to_device_x(5.0), 200.0);
        assert_eq!(a.to_device_y(20.0), 250.0);
    }

    #[test]
    fn mapping_extrapolates_outside_data_limits() {
        let a = area();
        assert_eq!(a.to_device_x(20.0), 500.0);
        assert_eq!(a.to_device_x(-10.0), -100.0);
    }

    #[test]
    fn degenerate_data_range_maps_to_draw_min() {
        let mut a = area();
        a.set_data_limits(Limits::new(4.0, 0.0, 4.0, 20.0));
        assert_eq!(a.to_device_x(4.0), 100.0);
        assert_eq!(a.to_device_x(123.0), 100.0);
    }

    #[test]
    fn data_xy_inverts_the_map() {
        let a = area();
        let (x, y) = a.data_xy(a.to_device_x(3.5), a.to_device_y(12.0));
        assert!((x - 3.5).abs() < 1e-12);
        assert!((y - 12.0).abs() < 1e-12);
    }

    #[test]
    fn map_points_updates_input_in_place() {
        let a = area();
        let mut pts = vec![GrPoint::new(0.0, 0.0), GrPoint::new(10.0, 20.0)];
        let returned = a.map_points(&mut pts);

        assert_eq!(pts[0], GrPoint::new(100.0, 50.0));
        assert_eq!(pts[1], GrPoint::new(300.0, 250.0));
        // The returned vector is allocated but never populated.
        assert_eq!(returned.len(), 2);
        assert_eq!(returned[0], GrPoint::default());
    }
}
