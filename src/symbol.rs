//! Symbol style descriptors and the classification engine.
//!
//! A [`Symbol`] either carries one plain style or classifies an external
//! data value into a color via one of four rules: unique-value matching,
//! sorted class breaks, or sign-dispatched scaling for bar and teacup
//! glyphs. Breakpoints arrive pre-sorted from the statistics collaborator;
//! the engine trusts sort order and the breakpoint/color-table length
//! correspondence and does not validate them.

use std::fmt;

use crate::color::GrColor;

/// What a symbol decorates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymbolKind {
    #[default]
    None,
    Point,
    Line,
    LineAndPoints,
    Polygon,
    PolygonAndPoint,
}

/// The glyph drawn for point symbols.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymbolStyle {
    #[default]
    None,
    CircleFilled,
    CircleHollow,
    SquareFilled,
    SquareHollow,
    TriangleUpFilled,
    TriangleUpHollow,
    TriangleDownFilled,
    TriangleDownHollow,
    DiamondFilled,
    DiamondHollow,
    Plus,
    X,
    Star,
    VerticalBar,
    /// Bar drawn upward for positive values, downward for negative ones;
    /// the two directions take the primary and secondary colors.
    SignedVerticalBar,
    Teacup,
}

/// Display names, one entry per style.
const STYLE_NAMES: &[(SymbolStyle, &str)] = &[
    (SymbolStyle::None, "None"),
    (SymbolStyle::CircleFilled, "Circle-Filled"),
    (SymbolStyle::CircleHollow, "Circle-Hollow"),
    (SymbolStyle::SquareFilled, "Square-Filled"),
    (SymbolStyle::SquareHollow, "Square-Hollow"),
    (SymbolStyle::TriangleUpFilled, "Triangle-Up-Filled"),
    (SymbolStyle::TriangleUpHollow, "Triangle-Up-Hollow"),
    (SymbolStyle::TriangleDownFilled, "Triangle-Down-Filled"),
    (SymbolStyle::TriangleDownHollow, "Triangle-Down-Hollow"),
    (SymbolStyle::DiamondFilled, "Diamond-Filled"),
    (SymbolStyle::DiamondHollow, "Diamond-Hollow"),
    (SymbolStyle::Plus, "Plus"),
    (SymbolStyle::X, "X"),
    (SymbolStyle::Star, "Star"),
    (SymbolStyle::VerticalBar, "Vertical-Bar"),
    (SymbolStyle::SignedVerticalBar, "Vertical-Bar-Signed"),
    (SymbolStyle::Teacup, "Teacup"),
];

impl SymbolStyle {
    pub fn name(self) -> &'static str {
        STYLE_NAMES
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, n)| *n)
            .unwrap_or("None")
    }

    /// Case-insensitive reverse lookup over the display-name table.
    pub fn from_name(name: &str) -> Option<SymbolStyle> {
        STYLE_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(s, _)| *s)
    }
}

impl fmt::Display for SymbolStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a data value selects a symbol's color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassificationKind {
    /// One configured color, value ignored.
    #[default]
    Single,
    /// Exact match against the breakpoint values.
    UniqueValue,
    /// Sorted ascending thresholds partitioning the axis into bins.
    ClassBreaks,
    /// Symbol size scales with the value; color from the sign for
    /// two-color glyphs.
    ScaledSymbol,
    /// Teacup glyph scaled by the value.
    ScaledTeacup,
}

/// The breakpoint array backing unique-value and class-breaks rules.
/// Exactly one representation is populated at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum BreakpointSet {
    #[default]
    None,
    Doubles(Vec<f64>),
    Ints(Vec<i64>),
    Strings(Vec<String>),
}

impl BreakpointSet {
    pub fn len(&self) -> usize {
        match self {
            BreakpointSet::None => 0,
            BreakpointSet::Doubles(v) => v.len(),
            BreakpointSet::Ints(v) => v.len(),
            BreakpointSet::Strings(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visual style descriptor plus optional classification state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub style: SymbolStyle,
    /// Primary drawing color.
    pub color: GrColor,
    /// Secondary color for sign-dependent two-color glyphs.
    pub color2: GrColor,
    pub outline_color: GrColor,
    /// Glyph size in device units; no physical unit implied.
    pub size_x: f64,
    pub size_y: f64,
    /// 0 = opaque, 255 = fully transparent.
    pub transparency: u8,
    /// Set on the symbol that carries a shape's main style when several
    /// symbols decorate one shape (e.g. polygon fill plus centroid mark).
    pub is_primary: bool,

    pub classification: ClassificationKind,
    /// Ordered color table; for class breaks it carries one more entry
    /// than the breakpoint array.
    pub color_table: Vec<GrColor>,
    breakpoints: BreakpointSet,
    /// Decimal places used when formatting classification labels.
    pub label_precision: usize,
}

impl Symbol {
    pub fn new(kind: SymbolKind, style: SymbolStyle) -> Self {
        Symbol {
            kind,
            style,
            color: GrColor::BLACK,
            color2: GrColor::BLACK,
            outline_color: GrColor::BLACK,
            size_x: 4.0,
            size_y: 4.0,
            label_precision: 2,
            ..Default::default()
        }
    }

    pub fn breakpoints(&self) -> &BreakpointSet {
        &self.breakpoints
    }

    /// Install double breakpoints, clearing any other representation.
    pub fn set_double_breakpoints(&mut self, values: Vec<f64>) {
        self.breakpoints = BreakpointSet::Doubles(values);
    }

    /// Install integer breakpoints, clearing any other representation.
    pub fn set_int_breakpoints(&mut self, values: Vec<i64>) {
        self.breakpoints = BreakpointSet::Ints(values);
    }

    /// Install string breakpoints, clearing any other representation.
    pub fn set_string_breakpoints(&mut self, values: Vec<String>) {
        self.breakpoints = BreakpointSet::Strings(values);
    }

    /// Resolve the color-table index for a numeric data value, or `None`
    /// when the rule yields no color (unique-value misses, empty tables).
    pub fn get_color_number(&self, value: f64) -> Option<usize> {
        match self.classification {
            ClassificationKind::Single
            | ClassificationKind::ScaledSymbol
            | ClassificationKind::ScaledTeacup => None,
            ClassificationKind::ClassBreaks => match &self.breakpoints {
                BreakpointSet::Doubles(b) => class_break_index(b, value),
                BreakpointSet::Ints(b) => {
                    let as_f64: Vec<f64> = b.iter().map(|v| *v as f64).collect();
                    class_break_index(&as_f64, value)
                }
                _ => None,
            },
            ClassificationKind::UniqueValue => match &self.breakpoints {
                BreakpointSet::Doubles(b) => b.iter().position(|v| *v == value),
                BreakpointSet::Ints(b) => b.iter().position(|v| *v as f64 == value),
                _ => None,
            },
        }
    }

    /// Resolve the drawing color for a numeric data value.
    ///
    /// Unique-value misses return `None`; callers supply their own
    /// fallback. Every other rule resolves to some color.
    pub fn get_color(&self, value: f64) -> Option<GrColor> {
        match self.classification {
            ClassificationKind::Single => Some(self.color),
            ClassificationKind::ScaledSymbol | ClassificationKind::ScaledTeacup => {
                // Sign-based two-color dispatch for the signed bar glyph;
                // zero counts as positive.
                if self.style == SymbolStyle::SignedVerticalBar && value < 0.0 {
                    Some(self.color2)
                } else {
                    Some(self.color)
                }
            }
            ClassificationKind::ClassBreaks | ClassificationKind::UniqueValue => self
                .get_color_number(value)
                .and_then(|i| self.color_table.get(i).copied()),
        }
    }

    /// Resolve the drawing color for a string data value (unique-value
    /// classification over string breakpoints only).
    pub fn get_color_for_string(&self, value: &str) -> Option<GrColor> {
        if self.classification != ClassificationKind::UniqueValue {
            return Some(self.color);
        }
        let BreakpointSet::Strings(b) = &self.breakpoints else {
            return None;
        };
        b.iter()
            .position(|v| v == value)
            .and_then(|i| self.color_table.get(i).copied())
    }

    /// Human-readable label for classification entry `i`.
    ///
    /// Class breaks yield range strings ("< 10.00", "10.00 <= x < 20.00",
    /// ">= 30.00"); unique-value yields the bare breakpoint value.
    pub fn classification_label(&self, i: usize) -> String {
        match self.classification {
            ClassificationKind::ClassBreaks => {
                let fmt = |v: f64| format!("{:.prec$}", v, prec = self.label_precision);
                let b: Vec<f64> = match &self.breakpoints {
                    BreakpointSet::Doubles(v) => v.clone(),
                    BreakpointSet::Ints(v) => v.iter().map(|x| *x as f64).collect(),
                    _ => return String::new(),
                };
                if b.is_empty() || i > b.len() {
                    return String::new();
                }
                if i == 0 {
                    format!("< {}", fmt(b[0]))
                } else if i == b.len() {
                    format!(">= {}", fmt(b[i - 1]))
                } else {
                    format!("{} <= x < {}", fmt(b[i - 1]), fmt(b[i]))
                }
            }
            ClassificationKind::UniqueValue => match &self.breakpoints {
                BreakpointSet::Doubles(v) => v
                    .get(i)
                    .map(|x| format!("{:.prec$}", x, prec = self.label_precision))
                    .unwrap_or_default(),
                BreakpointSet::Ints(v) => v.get(i).map(|x| x.to_string()).unwrap_or_default(),
                BreakpointSet::Strings(v) => v.get(i).cloned().unwrap_or_default(),
                BreakpointSet::None => String::new(),
            },
            _ => String::new(),
        }
    }
}

/// Clamp-and-bisect over sorted ascending breakpoints.
///
/// `value < b[0]` selects bin 0, `value >= b[last]` the bin past the last
/// breakpoint; in between, ascending scan for the first breakpoint above
/// the value. Bins are half-open: a value equal to a breakpoint falls in
/// the upper bin.
fn class_break_index(b: &[f64], value: f64) -> Option<usize> {
    if b.is_empty() {
        return None;
    }
    let n = b.len();
    if value < b[0] {
        Some(0)
    } else if value >= b[n - 1] {
        Some(n)
    } else {
        (1..n).find(|&i| value < b[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::GrColor;

    fn class_break_symbol() -> Symbol {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::CircleFilled);
        sym.classification = ClassificationKind::ClassBreaks;
        sym.color_table = vec![
            GrColor::rgb(0, 0, 255),
            GrColor::rgb(0, 255, 0),
            GrColor::rgb(255, 200, 0),
            GrColor::rgb(255, 0, 0),
        ];
        sym.set_double_breakpoints(vec![10.0, 20.0, 30.0]);
        sym
    }

    #[test]
    fn class_breaks_bin_table() {
        let sym = class_break_symbol();
        assert_eq!(sym.get_color_number(5.0), Some(0));
        assert_eq!(sym.get_color_number(10.0), Some(1));
        assert_eq!(sym.get_color_number(15.0), Some(1));
        assert_eq!(sym.get_color_number(25.0), Some(2));
        assert_eq!(sym.get_color_number(35.0), Some(3));
        assert_eq!(sym.get_color_number(1000.0), Some(3));
    }

    #[test]
    fn class_break_edge_values_fall_in_upper_bin() {
        let sym = class_break_symbol();
        assert_eq!(sym.get_color_number(20.0), Some(2));
        assert_eq!(sym.get_color_number(30.0), Some(3));
    }

    #[test]
    fn class_breaks_resolve_colors() {
        let sym = class_break_symbol();
        assert_eq!(sym.get_color(5.0), Some(GrColor::rgb(0, 0, 255)));
        assert_eq!(sym.get_color(1000.0), Some(GrColor::rgb(255, 0, 0)));
    }

    #[test]
    fn unique_value_miss_returns_none() {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::SquareFilled);
        sym.classification = ClassificationKind::UniqueValue;
        sym.color_table = vec![GrColor::rgb(255, 0, 0), GrColor::rgb(0, 0, 255)];
        sym.set_double_breakpoints(vec![1.0, 7.0]);

        assert_eq!(sym.get_color(7.0), Some(GrColor::rgb(0, 0, 255)));
        assert_eq!(sym.get_color(3.0), None);
    }

    #[test]
    fn unique_value_strings() {
        let mut sym = Symbol::new(SymbolKind::Polygon, SymbolStyle::None);
        sym.classification = ClassificationKind::UniqueValue;
        sym.color_table = vec![GrColor::rgb(255, 0, 0), GrColor::rgb(0, 255, 0)];
        sym.set_string_breakpoints(vec!["reservoir".into(), "channel".into()]);

        assert_eq!(sym.get_color_for_string("channel"), Some(GrColor::rgb(0, 255, 0)));
        assert_eq!(sym.get_color_for_string("aquifer"), None);
    }

    #[test]
    fn signed_bar_sign_dispatch() {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::SignedVerticalBar);
        sym.classification = ClassificationKind::ScaledSymbol;
        sym.color = GrColor::rgb(0, 0, 255);
        sym.color2 = GrColor::rgb(255, 0, 0);

        assert_eq!(sym.get_color(0.0), Some(GrColor::rgb(0, 0, 255)));
        assert_eq!(sym.get_color(-0.001), Some(GrColor::rgb(255, 0, 0)));
        assert_eq!(sym.get_color(12.5), Some(GrColor::rgb(0, 0, 255)));
    }

    #[test]
    fn scaled_symbol_other_styles_use_primary() {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::VerticalBar);
        sym.classification = ClassificationKind::ScaledSymbol;
        sym.color = GrColor::rgb(1, 2, 3);
        sym.color2 = GrColor::rgb(9, 9, 9);
        assert_eq!(sym.get_color(-5.0), Some(GrColor::rgb(1, 2, 3)));
    }

    #[test]
    fn single_ignores_value() {
        let mut sym = Symbol::new(SymbolKind::Line, SymbolStyle::None);
        sym.color = GrColor::rgb(7, 7, 7);
        assert_eq!(sym.get_color(f64::MIN), Some(GrColor::rgb(7, 7, 7)));
        assert_eq!(sym.get_color(f64::MAX), Some(GrColor::rgb(7, 7, 7)));
    }

    #[test]
    fn setting_breakpoints_clears_others() {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::None);
        sym.set_double_breakpoints(vec![1.0]);
        sym.set_string_breakpoints(vec!["a".into()]);
        assert!(matches!(sym.breakpoints(), BreakpointSet::Strings(_)));
        sym.set_int_breakpoints(vec![4]);
        assert!(matches!(sym.breakpoints(), BreakpointSet::Ints(_)));
    }

    #[test]
    fn class_break_labels() {
        let sym = class_break_symbol();
        assert_eq!(sym.classification_label(0), "< 10.00");
        assert_eq!(sym.classification_label(1), "10.00 <= x < 20.00");
        assert_eq!(sym.classification_label(3), ">= 30.00");
    }

    #[test]
    fn unique_value_labels_are_bare_values() {
        let mut sym = Symbol::new(SymbolKind::Point, SymbolStyle::None);
        sym.classification = ClassificationKind::UniqueValue;
        sym.set_string_breakpoints(vec!["gauge".into()]);
        assert_eq!(sym.classification_label(0), "gauge");
    }

    #[test]
    fn style_name_reverse_lookup() {
        assert_eq!(SymbolStyle::from_name("circle-filled"), Some(SymbolStyle::CircleFilled));
        assert_eq!(
            SymbolStyle::from_name("VERTICAL-BAR-SIGNED"),
            Some(SymbolStyle::SignedVerticalBar)
        );
        assert_eq!(SymbolStyle::from_name("nonagon"), None);
    }
}
