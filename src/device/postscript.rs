//! PostScript emission backend.
//!
//! Effectively a line-oriented compiler from drawing calls to PostScript
//! source text: `move_to` emits `"<x> <y> MT\n"`, `line_to` emits
//! `"<x> <y> LT\n"`, and a prolog emitted once per device binds the
//! custom operators (`MT`, `LT`, `ST`, the text operators `LS`/`CS`/`RS`,
//! and the orientation/size rescaling procedures). Operators append to an
//! in-memory buffer that `plot_end` drains to the underlying writer, so
//! drawing calls stay infallible and I/O failures surface only at the
//! resource boundary.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::anchor::TextAnchor;
use crate::color::GrColor;
use crate::errors::DeviceError;
use crate::types::{GrPoint, Limits};

use super::{CloseMode, Device, LineCap, LineJoin, Orientation, PageSize, Surface};

/// Consecutive `LT` tokens allowed between strokes. The 1000th segment
/// forces an implicit stroke-and-moveto to bound path complexity in
/// PostScript interpreters.
const MAX_SEGMENTS: u32 = 1000;

/// Logical font names mapped to PostScript standard font names. Lookups
/// are case-insensitive; unmatched names keep the previous font.
const FONTS: &[(&str, &str)] = &[
    ("helvetica", "Helvetica"),
    ("helvetica-bold", "Helvetica-Bold"),
    ("helvetica-oblique", "Helvetica-Oblique"),
    ("times", "Times-Roman"),
    ("times-bold", "Times-Bold"),
    ("times-italic", "Times-Italic"),
    ("courier", "Courier"),
    ("courier-bold", "Courier-Bold"),
    ("symbol", "Symbol"),
];

/// Sequential PostScript text emitter.
pub struct PsSurface {
    sink: Option<Box<dyn Write>>,
    out: String,
    /// Bytes of `out` already drained to the sink.
    flushed: usize,
    page: PageSize,
    orientation: Orientation,
    page_count: u32,
    /// `LT` tokens since the last stroke.
    segments: u32,
    /// Current point, for the implicit re-moveto after a forced stroke.
    cur: (f64, f64),
    font_size: f64,
}

impl fmt::Debug for PsSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PsSurface")
            .field("page", &self.page)
            .field("orientation", &self.orientation)
            .field("page_count", &self.page_count)
            .field("segments", &self.segments)
            .field("closed", &self.sink.is_none())
            .finish()
    }
}

impl PsSurface {
    /// Open `path` for writing and emit the document prolog.
    pub fn create(
        path: impl AsRef<Path>,
        page: PageSize,
        orientation: Orientation,
    ) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| DeviceError::Create {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::with_writer(Box::new(BufWriter::new(file)), page, orientation))
    }

    /// Emit into an arbitrary writer (used by tests with `io::sink()`).
    pub fn with_writer(sink: Box<dyn Write>, page: PageSize, orientation: Orientation) -> Self {
        let mut ps = PsSurface {
            sink: Some(sink),
            out: String::new(),
            flushed: 0,
            page,
            orientation,
            page_count: 0,
            segments: 0,
            cur: (0.0, 0.0),
            font_size: 10.0,
        };
        ps.emit_prolog();
        ps.begin_page();
        ps
    }

    /// Everything emitted so far, including undrained output.
    pub fn document(&self) -> &str {
        &self.out
    }

    /// Close the current page and open the next one.
    pub fn new_page(&mut self) {
        self.out.push_str("PE\n");
        self.begin_page();
    }

    fn begin_page(&mut self) {
        self.page_count += 1;
        let n = self.page_count;
        self.out.push_str(&format!("%%Page: {n} {n}\nPS\n"));
        self.emit_page_setup();
        self.segments = 0;
    }

    /// Orientation/size rescaling, chosen from the fixed procedure matrix.
    /// Content is authored in A-portrait coordinates; larger sheets scale
    /// up and landscape sheets rotate.
    fn emit_page_setup(&mut self) {
        let proc = match (self.orientation, self.page) {
            (Orientation::Portrait, PageSize::A) => None,
            (Orientation::Portrait, PageSize::B) => Some("PORTATOPORTB"),
            (Orientation::Portrait, _) => Some("PORTATOPORTD"),
            (Orientation::Landscape, PageSize::A) => Some("LNSCA"),
            (Orientation::Landscape, PageSize::B) => Some("LNSCB"),
            (Orientation::Landscape, _) => Some("LNSCD"),
        };
        if let Some(p) = proc {
            self.out.push_str(p);
            self.out.push('\n');
        }
    }

    fn emit_prolog(&mut self) {
        let (w, h) = self.page.points();
        let (bw, bh) = match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        self.out.push_str("%!PS-Adobe-2.0\n");
        self.out.push_str("%%Creator: grist\n");
        self.out
            .push_str(&format!("%%BoundingBox: 0 0 {} {}\n", bw as i64, bh as i64));
        self.out.push_str("%%Pages: (atend)\n");
        self.out.push_str("%%EndComments\n");
        // Operator prolog, bound once per device.
        self.out.push_str("/WI { setlinewidth } def\n");
        self.out
            .push_str("/CS { dup stringwidth pop 2 div neg 0 rmoveto show } def\n");
        self.out.push_str("/LNSCA { 90 rotate 0 -612 translate } def\n");
        self.out.push_str("/LNSCB { 90 rotate 0 -792 translate } def\n");
        self.out.push_str("/LNSCD { 90 rotate 0 -1584 translate } def\n");
        self.out.push_str("/LS { show } def\n");
        self.out.push_str("/LT { lineto } def\n");
        self.out.push_str("/MT { moveto } def\n");
        self.out.push_str("/PE { pgsave restore showpage } def\n");
        self.out
            .push_str("/PORTATOPORTB { 1.294117647 1.294117647 scale } def\n");
        self.out
            .push_str("/PORTATOPORTD { 2.588235294 2.588235294 scale } def\n");
        self.out
            .push_str("/RS { dup stringwidth pop neg 0 rmoveto show } def\n");
        self.out.push_str("/ST { currentpoint stroke moveto } def\n");
        self.out.push_str("/PS { /pgsave save def } def\n");
        self.out.push_str("%%EndProlog\n");
    }

    /// Elliptical arc path via a temporary scale, restoring the CTM with
    /// `setmatrix` so stroke widths stay uniform.
    fn emit_arc_path(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        self.out.push_str(&format!(
            "matrix currentmatrix {} {} translate {} {} scale newpath 0 0 1 {} {} arc setmatrix\n",
            fmt_coord(center.x),
            fmt_coord(center.y),
            fmt_coord(xradius),
            fmt_coord(yradius),
            fmt_coord(start),
            fmt_coord(end)
        ));
    }

    fn drain(&mut self) -> Result<(), DeviceError> {
        let sink = self.sink.as_mut().ok_or(DeviceError::Closed)?;
        let pending = &self.out.as_bytes()[self.flushed..];
        if !pending.is_empty() {
            sink.write_all(pending)?;
            self.flushed = self.out.len();
        }
        sink.flush()?;
        Ok(())
    }
}

/// Escape PostScript string-literal metacharacters. String literals are
/// parenthesis-delimited, so `(`, `)`, and `\` must be backslashed.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Format a coordinate with at least one fractional digit (`3.0`, `1.5`),
/// matching the historical emitter's token shape.
fn fmt_coord(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

impl Surface for PsSurface {
    fn set_color(&mut self, color: GrColor) {
        let (r, g, b) = color.unit();
        self.out
            .push_str(&format!("{r:.3} {g:.3} {b:.3} setrgbcolor\n"));
    }

    fn set_line_width(&mut self, width: f64) {
        self.out.push_str(&format!("{} WI\n", fmt_coord(width)));
    }

    fn set_dash(&mut self, pattern: Option<&[f64]>, offset: f64) {
        match pattern {
            Some(p) if !p.is_empty() => {
                let runs: Vec<String> = p.iter().map(|v| fmt_coord(*v)).collect();
                self.out.push_str(&format!(
                    "[{}] {} setdash\n",
                    runs.join(" "),
                    fmt_coord(offset)
                ));
            }
            _ => self.out.push_str("[] 0 setdash\n"),
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        let n = match cap {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        };
        self.out.push_str(&format!("{n} setlinecap\n"));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        let n = match join {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        };
        self.out.push_str(&format!("{n} setlinejoin\n"));
    }

    fn set_font(&mut self, name: &str, size: f64) {
        let Some((_, ps_name)) = FONTS.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) else {
            // Unmatched names keep the previous font.
            crate::log::debug!(name, "unknown font, keeping previous");
            return;
        };
        self.font_size = size;
        self.out.push_str(&format!(
            "/{} findfont {} scalefont setfont\n",
            ps_name,
            fmt_coord(size)
        ));
    }

    fn set_clip(&mut self, clip: Option<Limits>) {
        match clip {
            Some(c) => {
                self.out.push_str(&format!(
                    "initclip newpath {} {} MT {} {} LT {} {} LT {} {} LT closepath clip newpath\n",
                    fmt_coord(c.xmin),
                    fmt_coord(c.ymin),
                    fmt_coord(c.xmax),
                    fmt_coord(c.ymin),
                    fmt_coord(c.xmax),
                    fmt_coord(c.ymax),
                    fmt_coord(c.xmin),
                    fmt_coord(c.ymax)
                ));
            }
            None => self.out.push_str("initclip\n"),
        }
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.out
            .push_str(&format!("{} {} MT\n", fmt_coord(x), fmt_coord(y)));
        self.cur = (x, y);
        self.segments = 0;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.out
            .push_str(&format!("{} {} LT\n", fmt_coord(x), fmt_coord(y)));
        self.cur = (x, y);
        self.segments += 1;
        if self.segments >= MAX_SEGMENTS {
            // Bound path complexity: stroke what we have and restart the
            // path at the current point.
            let (cx, cy) = self.cur;
            self.out.push_str("ST\n");
            self.out
                .push_str(&format!("{} {} MT\n", fmt_coord(cx), fmt_coord(cy)));
            self.segments = 0;
        }
    }

    fn stroke(&mut self) {
        self.out.push_str("ST\n");
        self.segments = 0;
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.move_to(x1, y1);
        self.line_to(x2, y2);
        self.stroke();
    }

    fn draw_polyline(&mut self, pts: &[GrPoint]) {
        let Some(first) = pts.first() else { return };
        self.move_to(first.x, first.y);
        for p in &pts[1..] {
            self.line_to(p.x, p.y);
        }
        self.stroke();
    }

    fn draw_polygon(&mut self, pts: &[GrPoint]) {
        let Some(first) = pts.first() else { return };
        self.move_to(first.x, first.y);
        for p in &pts[1..] {
            self.line_to(p.x, p.y);
        }
        self.out.push_str("closepath\n");
        self.stroke();
    }

    fn fill_polygon(&mut self, pts: &[GrPoint]) {
        let Some(first) = pts.first() else { return };
        self.move_to(first.x, first.y);
        for p in &pts[1..] {
            self.line_to(p.x, p.y);
        }
        self.out.push_str("closepath fill\n");
        self.segments = 0;
    }

    fn draw_rectangle(&mut self, rect: Limits) {
        self.draw_polygon(&rect.corners());
    }

    fn fill_rectangle(&mut self, rect: Limits) {
        self.fill_polygon(&rect.corners());
    }

    fn draw_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        self.emit_arc_path(center, xradius, yradius, start, end);
        self.out.push_str("stroke\n");
        self.segments = 0;
    }

    fn fill_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        self.emit_arc_path(center, xradius, yradius, start, end);
        self.out.push_str("closepath fill\n");
        self.segments = 0;
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        // Vertical anchoring happens before emission: the operators only
        // handle horizontal placement.
        let y = if anchor.is_top() {
            y - self.font_size
        } else if anchor.is_center_y() {
            y - self.font_size / 2.0
        } else {
            y
        };
        let op = if anchor.is_center_x() {
            "CS"
        } else if anchor.is_right() {
            "RS"
        } else {
            "LS"
        };
        self.out
            .push_str(&format!("{} {} MT\n", fmt_coord(x), fmt_coord(y)));
        self.out.push_str(&format!("({}) {op}\n", escape_text(text)));
    }

    fn erase(&mut self) {
        // A sequential text stream has nothing to clear.
        crate::log::debug!("erase ignored on PostScript surface");
    }

    fn limits(&self) -> Limits {
        let (w, h) = self.page.points();
        match self.orientation {
            Orientation::Portrait => Limits::new(0.0, 0.0, w, h),
            Orientation::Landscape => Limits::new(0.0, 0.0, h, w),
        }
    }

    fn is_printing(&self) -> bool {
        true
    }

    fn plot_end(&mut self, mode: CloseMode) -> Result<(), DeviceError> {
        if self.sink.is_none() {
            return Err(DeviceError::Closed);
        }
        match mode {
            CloseMode::Soft => self.drain(),
            CloseMode::Hard => {
                self.out.push_str("PE\n%%Trailer\n");
                self.out
                    .push_str(&format!("%%Pages: {}\n%%EOF\n", self.page_count));
                self.drain()?;
                self.sink = None;
                Ok(())
            }
        }
    }
}

impl Device<PsSurface> {
    /// Create a PostScript device writing to `path`.
    pub fn create_postscript(
        path: impl AsRef<Path>,
        page: PageSize,
        orientation: Orientation,
    ) -> Result<Self, DeviceError> {
        Ok(Device::new(PsSurface::create(path, page, orientation)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> PsSurface {
        PsSurface::with_writer(Box::new(std::io::sink()), PageSize::A, Orientation::Portrait)
    }

    #[test]
    fn move_and_line_emit_exact_tokens() {
        let mut ps = surface();
        let before = ps.document().len();
        ps.move_to(1.5, 2.5);
        ps.line_to(3.0, 4.0);
        let emitted = &ps.document()[before..];
        assert_eq!(emitted, "1.5 2.5 MT\n3.0 4.0 LT\n");
    }

    #[test]
    fn integral_coords_keep_one_fractional_digit() {
        assert_eq!(fmt_coord(3.0), "3.0");
        assert_eq!(fmt_coord(-7.0), "-7.0");
        assert_eq!(fmt_coord(1.5), "1.5");
        assert_eq!(fmt_coord(0.25), "0.25");
    }

    #[test]
    fn segment_counter_forces_one_implicit_stroke() {
        let mut ps = surface();
        ps.move_to(0.0, 0.0);
        let before = ps.document().len();
        for i in 1..=1001 {
            ps.line_to(i as f64, 0.0);
        }
        let emitted = &ps.document()[before..];
        let strokes = emitted.matches("ST\n").count();
        let moves = emitted.matches(" MT\n").count();
        assert_eq!(strokes, 1, "exactly one implicit stroke");
        assert_eq!(moves, 1, "exactly one implicit re-moveto");
        // The implicit pair sits right after the 1000th segment.
        assert!(emitted.contains("1000.0 0.0 LT\nST\n1000.0 0.0 MT\n"));
    }

    #[test]
    fn explicit_stroke_resets_the_counter() {
        let mut ps = surface();
        ps.move_to(0.0, 0.0);
        for i in 0..999 {
            ps.line_to(i as f64, 1.0);
        }
        ps.stroke();
        let before = ps.document().len();
        for i in 0..999 {
            ps.line_to(i as f64, 2.0);
        }
        assert_eq!(ps.document()[before..].matches("ST\n").count(), 0);
    }

    #[test]
    fn prolog_defines_all_operators() {
        let ps = surface();
        let doc = ps.document();
        for op in [
            "/WI ", "/CS ", "/LNSCA ", "/LNSCB ", "/LNSCD ", "/LS ", "/LT ", "/MT ", "/PE ",
            "/PORTATOPORTB ", "/PORTATOPORTD ", "/RS ", "/ST ", "/PS ",
        ] {
            assert!(doc.contains(op), "prolog is missing {op}");
        }
        assert!(doc.starts_with("%!PS-Adobe-2.0\n"));
        assert!(doc.contains("%%BoundingBox: 0 0 612 792"));
        assert!(doc.contains("%%Page: 1 1\nPS\n"));
    }

    #[test]
    fn landscape_swaps_bounding_box_and_invokes_rescale() {
        let ps =
            PsSurface::with_writer(Box::new(std::io::sink()), PageSize::B, Orientation::Landscape);
        let doc = ps.document();
        assert!(doc.contains("%%BoundingBox: 0 0 1224 792"));
        assert!(doc.contains("PS\nLNSCB\n"));
    }

    #[test]
    fn text_operator_follows_horizontal_anchor() {
        let mut ps = surface();
        let before = ps.document().len();
        ps.draw_text(10.0, 20.0, "stage", TextAnchor::CENTER_X);
        ps.draw_text(10.0, 20.0, "stage", TextAnchor::RIGHT);
        ps.draw_text(10.0, 20.0, "stage", TextAnchor::LEFT);
        let emitted = &ps.document()[before..];
        assert!(emitted.contains("(stage) CS\n"));
        assert!(emitted.contains("(stage) RS\n"));
        assert!(emitted.contains("(stage) LS\n"));
    }

    #[test]
    fn text_vertical_anchor_offsets_by_font_height() {
        let mut ps = surface();
        ps.set_font("helvetica", 12.0);
        let before = ps.document().len();
        ps.draw_text(5.0, 100.0, "t", TextAnchor::LEFT | TextAnchor::TOP);
        ps.draw_text(5.0, 100.0, "t", TextAnchor::LEFT | TextAnchor::CENTER_Y);
        let emitted = &ps.document()[before..];
        assert!(emitted.contains("5.0 88.0 MT\n"));
        assert!(emitted.contains("5.0 94.0 MT\n"));
    }

    #[test]
    fn text_escapes_parens_and_backslashes() {
        let mut ps = surface();
        let before = ps.document().len();
        ps.draw_text(0.0, 0.0, r"flow (cfs) \ stage", TextAnchor::LEFT);
        let emitted = &ps.document()[before..];
        assert!(emitted.contains(r"(flow \(cfs\) \\ stage) LS"));
    }

    #[test]
    fn unknown_font_keeps_previous() {
        let mut ps = surface();
        ps.set_font("helvetica-bold", 14.0);
        let before = ps.document().len();
        ps.set_font("wingdings", 99.0);
        assert_eq!(&ps.document()[before..], "");
        // The stored height is still the matched font's.
        ps.draw_text(0.0, 50.0, "t", TextAnchor::LEFT | TextAnchor::TOP);
        assert!(ps.document().contains("0.0 36.0 MT\n"));
    }

    #[test]
    fn dash_cap_join_emit_raw_postscript() {
        let mut ps = surface();
        let before = ps.document().len();
        ps.set_dash(Some(&[4.0, 2.0]), 0.0);
        ps.set_line_cap(LineCap::Round);
        ps.set_line_join(LineJoin::Bevel);
        ps.set_dash(None, 0.0);
        let emitted = &ps.document()[before..];
        assert!(emitted.contains("[4.0 2.0] 0.0 setdash\n"));
        assert!(emitted.contains("1 setlinecap\n"));
        assert!(emitted.contains("2 setlinejoin\n"));
        assert!(emitted.contains("[] 0 setdash\n"));
    }

    #[test]
    fn hard_close_is_exactly_once() {
        let mut ps = surface();
        assert!(ps.plot_end(CloseMode::Soft).is_ok());
        assert!(ps.plot_end(CloseMode::Hard).is_ok());
        assert!(ps.document().ends_with("%%EOF\n"));
        assert!(matches!(ps.plot_end(CloseMode::Hard), Err(DeviceError::Closed)));
        assert!(matches!(ps.plot_end(CloseMode::Soft), Err(DeviceError::Closed)));
    }

    #[test]
    fn pages_bracketed_by_ps_pe() {
        let mut ps = surface();
        ps.new_page();
        ps.plot_end(CloseMode::Hard).unwrap();
        let doc = ps.document();
        assert!(doc.contains("PE\n%%Page: 2 2\nPS\n"));
        assert!(doc.contains("%%Pages: 2\n"));
    }

    #[test]
    fn arcs_scale_and_restore_the_matrix() {
        let mut ps = surface();
        let before = ps.document().len();
        ps.draw_arc(GrPoint::new(100.0, 200.0), 30.0, 15.0, 0.0, 90.0);
        let emitted = &ps.document()[before..];
        assert!(emitted.contains("matrix currentmatrix 100.0 200.0 translate 30.0 15.0 scale"));
        assert!(emitted.contains("0 0 1 0.0 90.0 arc setmatrix"));
        assert!(emitted.ends_with("stroke\n"));
    }

    #[test]
    fn is_printing_and_limits() {
        let ps = surface();
        assert!(ps.is_printing());
        assert_eq!(ps.limits(), Limits::new(0.0, 0.0, 612.0, 792.0));
    }
}
