//! Tagged-variant shape model.
//!
//! Each geometry kind is its own struct carrying a shared [`ShapeBase`]
//! (bounding box, visibility, selection, attribute hooks); the closed
//! [`Shape`] enum dispatches the common contract over them. Shapes are
//! created with a point count and populated index-by-index; every stored
//! point widens the bounding box incrementally.
//!
//! Point stores are branch-light on purpose: an out-of-bounds index is a
//! silent no-op, never an error, so hot drawing loops stay unguarded.

use enum_dispatch::enum_dispatch;

use crate::types::{GrPoint, GrPointZm, Limits};

/// State shared by every shape variant.
#[derive(Clone, Debug, Default)]
pub struct ShapeBase {
    /// Bounding box over all constituent coordinates. Only meaningful
    /// once `limits_found` is set; from then on xmin <= xmax and
    /// ymin <= ymax hold.
    pub limits: Limits,
    /// Monotone flag: set by the first stored point, cleared only by a
    /// reallocation via `set_num_points`.
    pub limits_found: bool,
    pub visible: bool,
    pub selected: bool,
    /// Opaque, non-owning reference to an associated object.
    pub assoc: Option<u64>,
    /// Index into an external attribute table.
    pub attr_index: Option<i64>,
}

impl ShapeBase {
    fn new() -> Self {
        ShapeBase { visible: true, ..Default::default() }
    }

    /// First point initializes the box, later points widen it.
    fn update_limits(&mut self, p: GrPoint) {
        if self.limits_found {
            self.limits.expand_point(p);
        } else {
            self.limits = Limits::from_point(p);
            self.limits_found = true;
        }
    }

    fn reset_limits(&mut self) {
        self.limits = Limits::default();
        self.limits_found = false;
    }
}

/// Common contract over all shape variants.
#[enum_dispatch]
pub trait ShapeOps {
    fn base(&self) -> &ShapeBase;
    fn base_mut(&mut self) -> &mut ShapeBase;

    /// Number of addressable points.
    fn num_points(&self) -> usize;

    /// (Re)allocate point storage and reset the bounding box.
    fn set_num_points(&mut self, n: usize);

    /// Store point `i`. Out-of-bounds indices are a silent no-op.
    fn set_point(&mut self, i: usize, p: GrPoint);

    /// Store point `i` with z and measure. Variants without a z/measure
    /// channel keep only the 2D projection.
    fn set_point_zm(&mut self, i: usize, p: GrPointZm) {
        self.set_point(i, p.xy());
    }
}

// ============================================================================
// Variants
// ============================================================================

/// A single point.
#[derive(Clone, Debug, Default)]
pub struct PointShape {
    pub base: ShapeBase,
    pub x: f64,
    pub y: f64,
}

impl PointShape {
    pub fn new(x: f64, y: f64) -> Self {
        let mut s = PointShape { base: ShapeBase::new(), x, y };
        s.base.update_limits(GrPoint::new(x, y));
        s
    }
}

impl ShapeOps for PointShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        1
    }

    fn set_num_points(&mut self, _n: usize) {
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        if i != 0 {
            return;
        }
        self.x = p.x;
        self.y = p.y;
        self.base.update_limits(p);
    }
}

/// A single point with z and measure.
#[derive(Clone, Debug, Default)]
pub struct PointZmShape {
    pub base: ShapeBase,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl PointZmShape {
    pub fn new(x: f64, y: f64, z: f64, m: f64) -> Self {
        let mut s = PointZmShape { base: ShapeBase::new(), x, y, z, m };
        s.base.update_limits(GrPoint::new(x, y));
        s
    }
}

impl ShapeOps for PointZmShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        1
    }

    fn set_num_points(&mut self, _n: usize) {
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        if i != 0 {
            return;
        }
        self.x = p.x;
        self.y = p.y;
        self.base.update_limits(p);
    }

    fn set_point_zm(&mut self, i: usize, p: GrPointZm) {
        if i != 0 {
            return;
        }
        self.x = p.x;
        self.y = p.y;
        self.z = p.z;
        self.m = p.m;
        self.base.update_limits(p.xy());
    }
}

/// An elliptical arc: center, per-axis radii, start/end angle in degrees.
#[derive(Clone, Debug, Default)]
pub struct ArcShape {
    pub base: ShapeBase,
    pub center: GrPoint,
    pub xradius: f64,
    pub yradius: f64,
    pub angle_start: f64,
    pub angle_end: f64,
}

impl ArcShape {
    pub fn new(center: GrPoint, xradius: f64, yradius: f64, angle_start: f64, angle_end: f64) -> Self {
        let mut s = ArcShape {
            base: ShapeBase::new(),
            center,
            xradius,
            yradius,
            angle_start,
            angle_end,
        };
        s.recompute_limits();
        s
    }

    fn recompute_limits(&mut self) {
        self.base.reset_limits();
        self.base.update_limits(GrPoint::new(
            self.center.x - self.xradius,
            self.center.y - self.yradius,
        ));
        self.base.update_limits(GrPoint::new(
            self.center.x + self.xradius,
            self.center.y + self.yradius,
        ));
    }

    /// Distance-based containment test.
    ///
    /// Only the x radius is tested against the Euclidean distance, so
    /// this is exact for circular arcs and wrong for elliptical ones.
    pub(crate) fn contains_box(&self, limits: &Limits) -> bool {
        limits
            .corners()
            .iter()
            .all(|c| self.center.distance(*c) <= self.xradius)
    }
}

impl ShapeOps for ArcShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        1
    }

    fn set_num_points(&mut self, _n: usize) {
        self.base.reset_limits();
    }

    /// Point 0 is the arc center.
    fn set_point(&mut self, i: usize, p: GrPoint) {
        if i != 0 {
            return;
        }
        self.center = p;
        self.recompute_limits();
    }
}

/// An arc decorated with cross hairs, used as an interactive locator.
#[derive(Clone, Debug, Default)]
pub struct LocatorArcShape {
    pub arc: ArcShape,
    pub cross_width: f64,
    pub cross_height: f64,
}

impl LocatorArcShape {
    pub fn new(arc: ArcShape, cross_width: f64, cross_height: f64) -> Self {
        LocatorArcShape { arc, cross_width, cross_height }
    }
}

impl ShapeOps for LocatorArcShape {
    fn base(&self) -> &ShapeBase {
        &self.arc.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.arc.base
    }

    fn num_points(&self) -> usize {
        self.arc.num_points()
    }

    fn set_num_points(&mut self, n: usize) {
        self.arc.set_num_points(n);
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        self.arc.set_point(i, p);
    }
}

/// An ordered, open sequence of points.
#[derive(Clone, Debug, Default)]
pub struct PolylineShape {
    pub base: ShapeBase,
    pub pts: Vec<GrPoint>,
}

impl PolylineShape {
    pub fn with_capacity(n: usize) -> Self {
        PolylineShape {
            base: ShapeBase::new(),
            pts: vec![GrPoint::default(); n],
        }
    }
}

impl ShapeOps for PolylineShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        self.pts.len()
    }

    fn set_num_points(&mut self, n: usize) {
        self.pts = vec![GrPoint::default(); n];
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        let Some(slot) = self.pts.get_mut(i) else {
            return;
        };
        *slot = p;
        self.base.update_limits(p);
    }
}

/// An ordered sequence of points with z and measure channels.
#[derive(Clone, Debug, Default)]
pub struct PolylineZmShape {
    pub base: ShapeBase,
    pub pts: Vec<GrPointZm>,
}

impl PolylineZmShape {
    pub fn with_capacity(n: usize) -> Self {
        PolylineZmShape {
            base: ShapeBase::new(),
            pts: vec![GrPointZm::default(); n],
        }
    }
}

impl ShapeOps for PolylineZmShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        self.pts.len()
    }

    fn set_num_points(&mut self, n: usize) {
        self.pts = vec![GrPointZm::default(); n];
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        self.set_point_zm(i, GrPointZm::new(p.x, p.y, 0.0, 0.0));
    }

    fn set_point_zm(&mut self, i: usize, p: GrPointZm) {
        let Some(slot) = self.pts.get_mut(i) else {
            return;
        };
        *slot = p;
        self.base.update_limits(p.xy());
    }
}

/// An ordered collection of polylines with an aggregate bounding box.
#[derive(Clone, Debug, Default)]
pub struct PolylineListShape {
    pub base: ShapeBase,
    pub lines: Vec<PolylineShape>,
}

impl PolylineListShape {
    pub fn new() -> Self {
        PolylineListShape { base: ShapeBase::new(), lines: Vec::new() }
    }

    /// Append a polyline, widening the aggregate bounding box.
    pub fn add_line(&mut self, line: PolylineShape) {
        if line.base.limits_found {
            if self.base.limits_found {
                self.base.limits = self.base.limits.union(&line.base.limits);
            } else {
                self.base.limits = line.base.limits;
                self.base.limits_found = true;
            }
        }
        self.lines.push(line);
    }
}

impl ShapeOps for PolylineListShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        self.lines.iter().map(|l| l.num_points()).sum()
    }

    fn set_num_points(&mut self, _n: usize) {
        self.lines.clear();
        self.base.reset_limits();
    }

    /// Points are addressed through the member polylines, not the list.
    fn set_point(&mut self, _i: usize, _p: GrPoint) {}
}

/// A closed ring of points. Closure is implied; the first point is not
/// repeated at the end.
#[derive(Clone, Debug, Default)]
pub struct PolygonShape {
    pub base: ShapeBase,
    pub pts: Vec<GrPoint>,
}

impl PolygonShape {
    pub fn with_capacity(n: usize) -> Self {
        PolygonShape {
            base: ShapeBase::new(),
            pts: vec![GrPoint::default(); n],
        }
    }
}

impl ShapeOps for PolygonShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        self.pts.len()
    }

    fn set_num_points(&mut self, n: usize) {
        self.pts = vec![GrPoint::default(); n];
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        let Some(slot) = self.pts.get_mut(i) else {
            return;
        };
        *slot = p;
        self.base.update_limits(p);
    }
}

/// An unordered scatter of points; sequence order carries no meaning for
/// rendering.
#[derive(Clone, Debug, Default)]
pub struct MultipointShape {
    pub base: ShapeBase,
    pub pts: Vec<GrPoint>,
}

impl MultipointShape {
    pub fn with_capacity(n: usize) -> Self {
        MultipointShape {
            base: ShapeBase::new(),
            pts: vec![GrPoint::default(); n],
        }
    }
}

impl ShapeOps for MultipointShape {
    fn base(&self) -> &ShapeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ShapeBase {
        &mut self.base
    }

    fn num_points(&self) -> usize {
        self.pts.len()
    }

    fn set_num_points(&mut self, n: usize) {
        self.pts = vec![GrPoint::default(); n];
        self.base.reset_limits();
    }

    fn set_point(&mut self, i: usize, p: GrPoint) {
        let Some(slot) = self.pts.get_mut(i) else {
            return;
        };
        *slot = p;
        self.base.update_limits(p);
    }
}

// ============================================================================
// The closed sum type
// ============================================================================

/// Every geometry kind the engine can draw.
#[enum_dispatch(ShapeOps)]
#[derive(Clone, Debug)]
pub enum Shape {
    Point(PointShape),
    PointZm(PointZmShape),
    Arc(ArcShape),
    LocatorArc(LocatorArcShape),
    Polyline(PolylineShape),
    PolylineZm(PolylineZmShape),
    PolylineList(PolylineListShape),
    Polygon(PolygonShape),
    Multipoint(MultipointShape),
}

impl Shape {
    pub fn limits(&self) -> Limits {
        self.base().limits
    }

    pub fn limits_found(&self) -> bool {
        self.base().limits_found
    }

    pub fn is_visible(&self) -> bool {
        self.base().visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.base_mut().visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.base().selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.base_mut().selected = selected;
    }

    /// Approximate containment test over bounding boxes.
    ///
    /// With `require_complete` set, an `other` whose bounding box was
    /// never computed is rejected outright. Arcs additionally run a
    /// Euclidean distance test against the x radius (see `ArcShape`).
    pub fn contains(&self, other: &Shape, require_complete: bool) -> bool {
        let ob = other.base();
        if require_complete && !ob.limits_found {
            return false;
        }
        if !self.base().limits.contains(&ob.limits) {
            return false;
        }
        match self {
            Shape::Arc(arc) => arc.contains_box(&ob.limits),
            Shape::LocatorArc(la) => la.arc.contains_box(&ob.limits),
            _ => true,
        }
    }
}

/// Equality is bounding-box plus point-array equality, not geometric
/// equivalence. Visibility, selection, and attribute hooks do not
/// participate.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        if self.base().limits != other.base().limits {
            return false;
        }
        match (self, other) {
            (Shape::Point(a), Shape::Point(b)) => a.x == b.x && a.y == b.y,
            (Shape::PointZm(a), Shape::PointZm(b)) => {
                a.x == b.x && a.y == b.y && a.z == b.z && a.m == b.m
            }
            (Shape::Arc(a), Shape::Arc(b)) => arc_eq(a, b),
            (Shape::LocatorArc(a), Shape::LocatorArc(b)) => {
                arc_eq(&a.arc, &b.arc)
                    && a.cross_width == b.cross_width
                    && a.cross_height == b.cross_height
            }
            (Shape::Polyline(a), Shape::Polyline(b)) => a.pts == b.pts,
            (Shape::PolylineZm(a), Shape::PolylineZm(b)) => a.pts == b.pts,
            (Shape::PolylineList(a), Shape::PolylineList(b)) => {
                a.lines.len() == b.lines.len()
                    && a.lines.iter().zip(&b.lines).all(|(x, y)| x.pts == y.pts)
            }
            (Shape::Polygon(a), Shape::Polygon(b)) => a.pts == b.pts,
            (Shape::Multipoint(a), Shape::Multipoint(b)) => a.pts == b.pts,
            _ => false,
        }
    }
}

fn arc_eq(a: &ArcShape, b: &ArcShape) -> bool {
    a.center == b.center
        && a.xradius == b.xradius
        && a.yradius == b.yradius
        && a.angle_start == b.angle_start
        && a.angle_end == b.angle_end
}

/// A container that exclusively owns its child shapes and tracks their
/// aggregate bounding box.
#[derive(Clone, Debug, Default)]
pub struct ShapeList {
    shapes: Vec<Shape>,
    limits: Limits,
    limits_found: bool,
}

impl ShapeList {
    pub fn new() -> Self {
        ShapeList::default()
    }

    pub fn add(&mut self, shape: Shape) {
        let b = shape.base();
        if b.limits_found {
            if self.limits_found {
                self.limits = self.limits.union(&b.limits);
            } else {
                self.limits = b.limits;
                self.limits_found = true;
            }
        }
        self.shapes.push(shape);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn limits(&self) -> Option<Limits> {
        self.limits_found.then_some(self.limits)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Shape> {
        self.shapes.iter_mut()
    }
}
