//! Output devices and the surface abstraction.
//!
//! A [`Surface`] is the native-operation contract the two backends
//! implement: the interactive, double-buffered raster surface
//! ([`raster::RasterSurface`]) and the sequential PostScript emitter
//! ([`postscript::PsSurface`]). A [`Device`] wraps one surface and owns
//! the ordered list of drawing areas on it (insertion order is paint
//! order); drawing goes through split-borrow [`AreaCtx`] handles so an
//! area never holds an owning pointer back to its device.
//!
//! The engine is single-threaded by contract: all calls to one device and
//! its areas come from one logical paint or export pass, and no internal
//! locking exists.

pub mod postscript;
pub mod raster;

use crate::anchor::TextAnchor;
use crate::area::DrawingArea;
use crate::color::GrColor;
use crate::errors::DeviceError;
use crate::types::{GrPoint, Limits};

/// How `plot_end` treats the backend's output resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseMode {
    /// Flush pending output and release the underlying handle.
    Hard,
    /// Flush pending output only; the device stays usable.
    Soft,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// ANSI page sizes for printing backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageSize {
    #[default]
    A,
    B,
    C,
    D,
    E,
}

const PAGE_SIZE_NAMES: &[(PageSize, &str)] = &[
    (PageSize::A, "A"),
    (PageSize::B, "B"),
    (PageSize::C, "C"),
    (PageSize::D, "D"),
    (PageSize::E, "E"),
];

impl PageSize {
    /// Portrait width and height in PostScript points (1/72 inch).
    pub fn points(self) -> (f64, f64) {
        match self {
            PageSize::A => (612.0, 792.0),
            PageSize::B => (792.0, 1224.0),
            PageSize::C => (1224.0, 1584.0),
            PageSize::D => (1584.0, 2448.0),
            PageSize::E => (2448.0, 3168.0),
        }
    }

    pub fn name(self) -> &'static str {
        PAGE_SIZE_NAMES
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, n)| *n)
            .unwrap_or("A")
    }

    /// Case-insensitive reverse lookup over the name table.
    pub fn from_name(name: &str) -> Option<PageSize> {
        PAGE_SIZE_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(s, _)| *s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Native drawing contract implemented by both backends.
///
/// All coordinates are device units. State setters apply to subsequent
/// operations; path state (`move_to`/`line_to`) persists until `stroke`.
pub trait Surface {
    fn set_color(&mut self, color: GrColor);
    fn set_line_width(&mut self, width: f64);
    fn set_dash(&mut self, pattern: Option<&[f64]>, offset: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Select a logical font. Unknown names silently keep the previous
    /// font (hot-path policy).
    fn set_font(&mut self, name: &str, size: f64);
    fn set_clip(&mut self, clip: Option<Limits>);

    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn draw_polyline(&mut self, pts: &[GrPoint]);
    fn draw_polygon(&mut self, pts: &[GrPoint]);
    fn fill_polygon(&mut self, pts: &[GrPoint]);
    fn draw_rectangle(&mut self, rect: Limits);
    fn fill_rectangle(&mut self, rect: Limits);
    /// Angles in degrees, counter-clockwise from the positive x axis.
    fn draw_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64);
    fn fill_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64);
    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor);

    /// Clear the surface to its background.
    fn erase(&mut self);

    /// Current device-space extent.
    fn limits(&self) -> Limits;

    /// True for backends that produce printed/exported output rather
    /// than an interactive surface.
    fn is_printing(&self) -> bool;

    /// Flush (and for `Hard`, close) the backend's output resource.
    /// Must succeed exactly once with `Hard`; a second hard close is an
    /// error.
    fn plot_end(&mut self, mode: CloseMode) -> Result<(), DeviceError>;
}

/// Handle to a drawing area owned by a device: its slot in paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaId(pub(crate) usize);

/// One output surface plus the ordered drawing areas painted onto it.
#[derive(Debug)]
pub struct Device<S: Surface> {
    surface: S,
    areas: Vec<DrawingArea>,
}

impl<S: Surface> Device<S> {
    pub fn new(surface: S) -> Self {
        Device { surface, areas: Vec::new() }
    }

    /// Append a drawing area; insertion order is paint order. The area's
    /// back-reference is set to its slot.
    pub fn add_drawing_area(&mut self, mut area: DrawingArea) -> AreaId {
        let id = AreaId(self.areas.len());
        area.slot = Some(id);
        self.areas.push(area);
        id
    }

    pub fn num_areas(&self) -> usize {
        self.areas.len()
    }

    pub fn area(&self, id: AreaId) -> &DrawingArea {
        &self.areas[id.0]
    }

    pub fn area_mut(&mut self, id: AreaId) -> &mut DrawingArea {
        &mut self.areas[id.0]
    }

    /// Drawing areas in paint order.
    pub fn areas(&self) -> impl Iterator<Item = &DrawingArea> {
        self.areas.iter()
    }

    /// Borrow one area together with the surface for a run of draw calls.
    /// The area's pen state is synced to the surface up front.
    pub fn area_ctx(&mut self, id: AreaId) -> AreaCtx<'_, S> {
        let area = &mut self.areas[id.0];
        let surface = &mut self.surface;
        surface.set_color(area.pen.color);
        surface.set_line_width(area.pen.line_width);
        surface.set_dash(area.pen.dash.as_deref(), 0.0);
        surface.set_font(&area.pen.font, area.pen.font_size);
        surface.set_clip(area.clip);
        AreaCtx { area, surface }
    }

    /// The backend's native context, for the duration of one paint pass.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn limits(&self) -> Limits {
        self.surface.limits()
    }

    pub fn is_printing(&self) -> bool {
        self.surface.is_printing()
    }

    pub fn plot_end(&mut self, mode: CloseMode) -> Result<(), DeviceError> {
        self.surface.plot_end(mode)
    }
}

/// Split borrow of one drawing area and the device surface.
///
/// Primitive calls accept already-device-mapped coordinates; callers map
/// from data space explicitly via the area's `to_device*` methods, which
/// remain available through [`AreaCtx::area`].
pub struct AreaCtx<'a, S: Surface> {
    area: &'a mut DrawingArea,
    surface: &'a mut S,
}

impl<'a, S: Surface> AreaCtx<'a, S> {
    pub fn area(&self) -> &DrawingArea {
        self.area
    }

    pub fn area_mut(&mut self) -> &mut DrawingArea {
        self.area
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.surface.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.surface.line_to(x, y);
    }

    pub fn stroke(&mut self) {
        self.surface.stroke();
    }

    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.surface.draw_line(x1, y1, x2, y2);
    }

    pub fn draw_polyline(&mut self, pts: &[GrPoint]) {
        self.surface.draw_polyline(pts);
    }

    pub fn draw_polygon(&mut self, pts: &[GrPoint]) {
        self.surface.draw_polygon(pts);
    }

    pub fn fill_polygon(&mut self, pts: &[GrPoint]) {
        self.surface.fill_polygon(pts);
    }

    pub fn draw_rectangle(&mut self, rect: Limits) {
        self.surface.draw_rectangle(rect);
    }

    pub fn fill_rectangle(&mut self, rect: Limits) {
        self.surface.fill_rectangle(rect);
    }

    pub fn draw_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        self.surface.draw_arc(center, xradius, yradius, start, end);
    }

    pub fn fill_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        self.surface.fill_arc(center, xradius, yradius, start, end);
    }

    pub fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        self.surface.draw_text(x, y, text, anchor);
    }

    /// Update the pen color both on the area and the live surface.
    pub fn set_color(&mut self, color: GrColor) {
        self.area.pen.color = color;
        self.surface.set_color(color);
    }

    /// Update the line width both on the area and the live surface.
    pub fn set_line_width(&mut self, width: f64) {
        self.area.pen.line_width = width;
        self.surface.set_line_width(width);
    }
}
