//! Geometry primitives shared across the engine.
//!
//! Coordinates are plain `f64` device or data units; no physical unit is
//! implied. `Limits` is the axis-aligned rectangle used both for shape
//! bounding boxes and for drawing-area draw/data extents.

use std::fmt;

/// A 2D point in data or device space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrPoint {
    pub x: f64,
    pub y: f64,
}

impl GrPoint {
    pub fn new(x: f64, y: f64) -> Self {
        GrPoint { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: GrPoint) -> f64 {
        glam::DVec2::new(self.x, self.y).distance(glam::DVec2::new(other.x, other.y))
    }
}

impl fmt::Display for GrPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A point carrying a third dimension and a measure value.
///
/// The z and measure components ride along with the geometry but play no
/// part in 2D rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GrPointZm {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl GrPointZm {
    pub fn new(x: f64, y: f64, z: f64, m: f64) -> Self {
        GrPointZm { x, y, z, m }
    }

    /// The 2D projection of this point.
    pub fn xy(self) -> GrPoint {
        GrPoint { x: self.x, y: self.y }
    }
}

/// An axis-aligned rectangle.
///
/// Invariant once computed: `xmin <= xmax` and `ymin <= ymax`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Limits {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Limits {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Limits { xmin, ymin, xmax, ymax }
    }

    /// A degenerate rectangle covering exactly one point.
    pub fn from_point(p: GrPoint) -> Self {
        Limits { xmin: p.x, ymin: p.y, xmax: p.x, ymax: p.y }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center(&self) -> GrPoint {
        GrPoint {
            x: (self.xmin + self.xmax) / 2.0,
            y: (self.ymin + self.ymax) / 2.0,
        }
    }

    /// Widen to include a point (first call after construction from a point
    /// is a no-op if the point is already inside).
    pub fn expand_point(&mut self, p: GrPoint) {
        self.xmin = self.xmin.min(p.x);
        self.ymin = self.ymin.min(p.y);
        self.xmax = self.xmax.max(p.x);
        self.ymax = self.ymax.max(p.y);
    }

    /// The smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Limits) -> Limits {
        Limits {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// The overlap of `self` and `other`, or `None` when they are
    /// disjoint.
    pub fn intersection(&self, other: &Limits) -> Option<Limits> {
        let out = Limits {
            xmin: self.xmin.max(other.xmin),
            ymin: self.ymin.max(other.ymin),
            xmax: self.xmax.min(other.xmax),
            ymax: self.ymax.min(other.ymax),
        };
        (out.xmin <= out.xmax && out.ymin <= out.ymax).then_some(out)
    }

    pub fn contains_point(&self, p: GrPoint) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// True if `other` lies entirely within `self`.
    pub fn contains(&self, other: &Limits) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// The four corner points, counter-clockwise from the minimum corner.
    pub fn corners(&self) -> [GrPoint; 4] {
        [
            GrPoint::new(self.xmin, self.ymin),
            GrPoint::new(self.xmax, self.ymin),
            GrPoint::new(self.xmax, self.ymax),
            GrPoint::new(self.xmin, self.ymax),
        ]
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}

/// Per-axis affine map between two ranges.
///
/// Plain linear interpolation that extrapolates for values outside
/// `[xmin, xmax]`; it never clamps. The degenerate case `xmax == xmin`
/// returns `ymin` for any input.
pub fn interpolate(x: f64, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> f64 {
    if xmax == xmin {
        ymin
    } else {
        ymin + (x - xmin) * (ymax - ymin) / (xmax - xmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== interpolate tests ====================

    #[test]
    fn interpolate_midpoint() {
        assert_eq!(interpolate(5.0, 0.0, 10.0, 0.0, 100.0), 50.0);
    }

    #[test]
    fn interpolate_endpoints() {
        assert_eq!(interpolate(0.0, 0.0, 10.0, 20.0, 120.0), 20.0);
        assert_eq!(interpolate(10.0, 0.0, 10.0, 20.0, 120.0), 120.0);
    }

    #[test]
    fn interpolate_extrapolates_not_clamps() {
        assert_eq!(interpolate(20.0, 0.0, 10.0, 0.0, 100.0), 200.0);
        assert_eq!(interpolate(-5.0, 0.0, 10.0, 0.0, 100.0), -50.0);
    }

    #[test]
    fn interpolate_degenerate_range_returns_ymin() {
        assert_eq!(interpolate(42.0, 3.0, 3.0, 7.0, 9.0), 7.0);
        assert_eq!(interpolate(-1e9, 3.0, 3.0, 7.0, 9.0), 7.0);
    }

    #[test]
    fn interpolate_inverted_output_range() {
        // Device y axes often run top-down; the map must handle ymax < ymin.
        assert_eq!(interpolate(5.0, 0.0, 10.0, 100.0, 0.0), 50.0);
    }

    // ==================== Limits tests ====================

    #[test]
    fn limits_expand_point() {
        let mut l = Limits::from_point(GrPoint::new(1.0, 2.0));
        l.expand_point(GrPoint::new(-1.0, 5.0));
        assert_eq!(l, Limits::new(-1.0, 2.0, 1.0, 5.0));
    }

    #[test]
    fn limits_union() {
        let a = Limits::new(0.0, 0.0, 2.0, 2.0);
        let b = Limits::new(1.0, -1.0, 3.0, 1.0);
        assert_eq!(a.union(&b), Limits::new(0.0, -1.0, 3.0, 2.0));
    }

    #[test]
    fn limits_intersection() {
        let a = Limits::new(0.0, 0.0, 2.0, 2.0);
        let b = Limits::new(1.0, 1.0, 3.0, 3.0);
        assert_eq!(a.intersection(&b), Some(Limits::new(1.0, 1.0, 2.0, 2.0)));
        let c = Limits::new(5.0, 5.0, 6.0, 6.0);
        assert_eq!(a.intersection(&c), None);
        // Touching edges count as a degenerate overlap.
        let d = Limits::new(2.0, 0.0, 4.0, 2.0);
        assert_eq!(a.intersection(&d), Some(Limits::new(2.0, 0.0, 2.0, 2.0)));
    }

    #[test]
    fn limits_contains() {
        let outer = Limits::new(0.0, 0.0, 10.0, 10.0);
        let inner = Limits::new(2.0, 2.0, 8.0, 8.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }

    #[test]
    fn point_distance() {
        let a = GrPoint::new(0.0, 0.0);
        let b = GrPoint::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }
}
