//! Interactive raster backend.
//!
//! A double-buffered pixel surface: drawing lands on the off-screen
//! buffer when one exists, otherwise on the visible pixmap, and
//! `show_double_buffer` blits the buffer across. Export goes through
//! `save_as_file`, which picks PNG or JPEG from the file extension and
//! coerces anything unrecognized to JPEG.
//!
//! Text is CPU-rasterized with fontdue when a font has been loaded; with
//! no font, text draws are skipped with a warning rather than failing
//! the paint pass. Glyph coverage is alpha-blended, so text stays
//! anti-aliased regardless of the general anti-alias toggle.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiny_skia::{
    FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};

use crate::anchor::TextAnchor;
use crate::color::GrColor;
use crate::errors::DeviceError;
use crate::types::{GrPoint, Limits};

use super::{CloseMode, Device, LineCap, LineJoin, Surface};

const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Clone, Debug)]
struct Pen {
    color: GrColor,
    width: f32,
    dash: Option<Vec<f32>>,
    cap: tiny_skia::LineCap,
    join: tiny_skia::LineJoin,
}

impl Default for Pen {
    fn default() -> Self {
        Pen {
            color: GrColor::BLACK,
            width: 1.0,
            dash: None,
            cap: tiny_skia::LineCap::Butt,
            join: tiny_skia::LineJoin::Miter,
        }
    }
}

/// Interactive, double-buffered pixel surface.
pub struct RasterSurface {
    visible: Pixmap,
    buffer: Option<Pixmap>,
    buffer_origin: (i32, i32),
    background: GrColor,
    anti_alias: bool,
    jpeg_quality: u8,
    pen: Pen,
    clip_rect: Option<Limits>,
    clip_mask: Option<Mask>,
    path: PathBuilder,
    font: Option<fontdue::Font>,
    font_size: f32,
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.visible.width())
            .field("height", &self.visible.height())
            .field("buffered", &self.buffer.is_some())
            .field("anti_alias", &self.anti_alias)
            .finish()
    }
}

impl RasterSurface {
    /// Allocate a visible surface filled with the default (white)
    /// background.
    pub fn new(width: u32, height: u32) -> Result<Self, DeviceError> {
        let mut visible =
            Pixmap::new(width, height).ok_or(DeviceError::BufferAlloc { width, height })?;
        let background = GrColor::WHITE;
        visible.fill(ts_color(background));
        Ok(RasterSurface {
            visible,
            buffer: None,
            buffer_origin: (0, 0),
            background,
            anti_alias: true,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            pen: Pen::default(),
            clip_rect: None,
            clip_mask: None,
            path: PathBuilder::new(),
            font: None,
            font_size: 10.0,
        })
    }

    /// Allocate a fully transparent off-screen buffer covering the given
    /// device rectangle, releasing any prior buffer first so peak memory
    /// stays bounded by roughly two frames.
    pub fn setup_double_buffer(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), DeviceError> {
        let width = x2.abs_diff(x1);
        let height = y2.abs_diff(y1);
        self.buffer = None;
        self.buffer = Some(Pixmap::new(width, height).ok_or(DeviceError::BufferAlloc {
            width,
            height,
        })?);
        self.buffer_origin = (x1.min(x2), y1.min(y2));
        self.rebuild_clip_mask();
        Ok(())
    }

    /// Blit the off-screen buffer onto the visible surface. A no-op when
    /// no buffer exists.
    pub fn show_double_buffer(&mut self) {
        let Some(buffer) = &self.buffer else { return };
        let (ox, oy) = self.buffer_origin;
        self.visible.draw_pixmap(
            ox,
            oy,
            buffer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(|b| (b.width(), b.height()))
    }

    pub fn set_anti_alias(&mut self, on: bool) {
        self.anti_alias = on;
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    /// JPEG export quality, 0-100.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.jpeg_quality = quality.min(100);
    }

    pub fn set_background(&mut self, color: GrColor) {
        self.background = color;
    }

    /// Load font data (TTF/OTF bytes) for text rendering.
    pub fn load_font(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| DeviceError::Font { message: e.to_string() })?;
        self.font = Some(font);
        Ok(())
    }

    /// Read access to the visible pixels (the backend's native context).
    pub fn pixels(&self) -> &Pixmap {
        &self.visible
    }

    /// Save the off-screen buffer to `path`, dispatching on extension:
    /// `.png` encodes PNG, `.jpg`/`.jpeg` encodes JPEG at the configured
    /// quality, and anything else is coerced to `.jpg`. Fails when no
    /// buffer has been set up.
    pub fn save_as_file(&self, path: impl AsRef<Path>) -> Result<(), DeviceError> {
        let Some(buffer) = &self.buffer else {
            return Err(DeviceError::NoBuffer);
        };
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => {
                let bytes = buffer
                    .encode_png()
                    .map_err(|e| DeviceError::Encode { message: e.to_string() })?;
                std::fs::write(path, bytes)?;
                Ok(())
            }
            Some("jpg") | Some("jpeg") => self.write_jpeg(buffer, path),
            _ => self.write_jpeg(buffer, &path.with_extension("jpg")),
        }
    }

    /// Composite the premultiplied buffer over the background and encode
    /// as RGB JPEG.
    fn write_jpeg(&self, buffer: &Pixmap, path: &Path) -> Result<(), DeviceError> {
        let (w, h) = (buffer.width(), buffer.height());
        let bg = self.background;
        let data = buffer.data();
        let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
        for (src, dst) in data.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
            let inv = 255 - src[3] as u32;
            dst[0] = (src[0] as u32 + bg.r as u32 * inv / 255) as u8;
            dst[1] = (src[1] as u32 + bg.g as u32 * inv / 255) as u8;
            dst[2] = (src[2] as u32 + bg.b as u32 * inv / 255) as u8;
        }
        let file = File::create(path).map_err(|source| DeviceError::Create {
            path: path.display().to_string(),
            source,
        })?;
        let mut enc =
            image::codecs::jpeg::JpegEncoder::new_with_quality(BufWriter::new(file), self.jpeg_quality);
        enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
            .map_err(|e| DeviceError::Encode { message: e.to_string() })?;
        Ok(())
    }

    // ==================== drawing internals ====================

    fn target_size(&self) -> (u32, u32) {
        match &self.buffer {
            Some(b) => (b.width(), b.height()),
            None => (self.visible.width(), self.visible.height()),
        }
    }

    /// Translation from device coordinates into the current target.
    fn target_transform(&self) -> Transform {
        if self.buffer.is_some() {
            let (ox, oy) = self.buffer_origin;
            Transform::from_translate(-(ox as f32), -(oy as f32))
        } else {
            Transform::identity()
        }
    }

    fn rebuild_clip_mask(&mut self) {
        self.clip_mask = None;
        let Some(rect) = self.clip_rect else { return };
        let (w, h) = self.target_size();
        let (ox, oy) = if self.buffer.is_some() {
            self.buffer_origin
        } else {
            (0, 0)
        };
        let bounds = Limits::new(
            ox as f64,
            oy as f64,
            ox as f64 + w as f64,
            oy as f64 + h as f64,
        );
        // A clip fully outside the target leaves the empty mask in place,
        // which suppresses all draws.
        let Some(c) = rect.intersection(&bounds) else {
            self.clip_mask = Mask::new(w, h);
            return;
        };
        let Some(mut mask) = Mask::new(w, h) else {
            crate::log::warn!("clip mask allocation failed, clipping disabled");
            return;
        };
        let Some(rect) = Rect::from_ltrb(
            c.xmin as f32,
            c.ymin as f32,
            c.xmax as f32,
            c.ymax as f32,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        mask.fill_path(&path, FillRule::Winding, true, self.target_transform());
        self.clip_mask = Some(mask);
    }

    fn make_paint(&self) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(ts_color(self.pen.color));
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn make_stroke(&self) -> Stroke {
        Stroke {
            width: self.pen.width.max(0.01),
            line_cap: self.pen.cap,
            line_join: self.pen.join,
            dash: self
                .pen
                .dash
                .clone()
                .and_then(|runs| StrokeDash::new(runs, 0.0)),
            ..Stroke::default()
        }
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path) {
        let paint = self.make_paint();
        let stroke = self.make_stroke();
        let transform = self.target_transform();
        let Self { visible, buffer, clip_mask, .. } = self;
        let target = buffer.as_mut().unwrap_or(visible);
        target.stroke_path(path, &paint, &stroke, transform, clip_mask.as_ref());
    }

    fn fill_path(&mut self, path: &tiny_skia::Path) {
        let paint = self.make_paint();
        let transform = self.target_transform();
        let Self { visible, buffer, clip_mask, .. } = self;
        let target = buffer.as_mut().unwrap_or(visible);
        target.fill_path(path, &paint, FillRule::Winding, transform, clip_mask.as_ref());
    }

    fn polyline_path(pts: &[GrPoint], close: bool) -> Option<tiny_skia::Path> {
        let first = pts.first()?;
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in &pts[1..] {
            pb.line_to(p.x as f32, p.y as f32);
        }
        if close {
            pb.close();
        }
        pb.finish()
    }

    /// Flatten an elliptical arc into line segments, counter-clockwise
    /// from the positive x axis (device y grows downward).
    fn arc_points(center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) -> Vec<GrPoint> {
        let span = end - start;
        let steps = ((span.abs() / 4.0).ceil() as usize).max(8);
        let c = glam::DVec2::new(center.x, center.y);
        (0..=steps)
            .map(|i| {
                let t = (start + span * (i as f64) / (steps as f64)).to_radians();
                GrPoint::new(c.x + t.cos() * xradius, c.y - t.sin() * yradius)
            })
            .collect()
    }

    /// Src-over blend of one coverage value into the target pixmap.
    fn blend_pixel(target: &mut Pixmap, x: i32, y: i32, color: GrColor, coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (w, h) = (target.width() as i32, target.height() as i32);
        if x >= w || y >= h {
            return;
        }
        let a = (color.a as u32 * coverage as u32) / 255;
        if a == 0 {
            return;
        }
        let idx = ((y * w + x) * 4) as usize;
        let data = target.data_mut();
        let inv = 255 - a;
        // Premultiplied source channels.
        let sr = color.r as u32 * a / 255;
        let sg = color.g as u32 * a / 255;
        let sb = color.b as u32 * a / 255;
        data[idx] = (sr + data[idx] as u32 * inv / 255) as u8;
        data[idx + 1] = (sg + data[idx + 1] as u32 * inv / 255) as u8;
        data[idx + 2] = (sb + data[idx + 2] as u32 * inv / 255) as u8;
        data[idx + 3] = (a + data[idx + 3] as u32 * inv / 255) as u8;
    }
}

fn ts_color(c: GrColor) -> tiny_skia::Color {
    let a = if c.is_transparent() { 0 } else { c.a };
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, a)
}

impl Surface for RasterSurface {
    fn set_color(&mut self, color: GrColor) {
        self.pen.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.pen.width = width as f32;
    }

    fn set_dash(&mut self, pattern: Option<&[f64]>, _offset: f64) {
        self.pen.dash = pattern
            .filter(|p| !p.is_empty())
            .map(|p| p.iter().map(|v| *v as f32).collect());
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.pen.cap = match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        };
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.pen.join = match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        };
    }

    fn set_font(&mut self, _name: &str, size: f64) {
        // One loaded face; logical names select only the size here.
        self.font_size = size as f32;
    }

    fn set_clip(&mut self, clip: Option<Limits>) {
        self.clip_rect = clip;
        self.rebuild_clip_mask();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(x as f32, y as f32);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to(x as f32, y as f32);
    }

    fn stroke(&mut self) {
        let pb = std::mem::replace(&mut self.path, PathBuilder::new());
        if let Some(path) = pb.finish() {
            self.stroke_path(&path);
        }
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let mut pb = PathBuilder::new();
        pb.move_to(x1 as f32, y1 as f32);
        pb.line_to(x2 as f32, y2 as f32);
        if let Some(path) = pb.finish() {
            self.stroke_path(&path);
        }
    }

    fn draw_polyline(&mut self, pts: &[GrPoint]) {
        if let Some(path) = Self::polyline_path(pts, false) {
            self.stroke_path(&path);
        }
    }

    fn draw_polygon(&mut self, pts: &[GrPoint]) {
        if let Some(path) = Self::polyline_path(pts, true) {
            self.stroke_path(&path);
        }
    }

    fn fill_polygon(&mut self, pts: &[GrPoint]) {
        if let Some(path) = Self::polyline_path(pts, true) {
            self.fill_path(&path);
        }
    }

    fn draw_rectangle(&mut self, rect: Limits) {
        self.draw_polygon(&rect.corners());
    }

    fn fill_rectangle(&mut self, rect: Limits) {
        self.fill_polygon(&rect.corners());
    }

    fn draw_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        let pts = Self::arc_points(center, xradius, yradius, start, end);
        self.draw_polyline(&pts);
    }

    fn fill_arc(&mut self, center: GrPoint, xradius: f64, yradius: f64, start: f64, end: f64) {
        // Pie fill: close through the center.
        let mut pts = Self::arc_points(center, xradius, yradius, start, end);
        pts.push(center);
        self.fill_polygon(&pts);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, anchor: TextAnchor) {
        let color = self.pen.color;
        let clip = self.clip_rect;
        let size = self.font_size;
        let transform = self.target_transform();
        let Self { visible, buffer, font, .. } = self;
        let Some(font) = font.as_ref() else {
            crate::log::warn!(text, "no font loaded, skipping text draw");
            return;
        };
        let target = buffer.as_mut().unwrap_or(visible);

        let width: f32 = text
            .chars()
            .map(|ch| font.metrics(ch, size).advance_width)
            .sum();
        let mut pen_x = x as f32
            - if anchor.is_center_x() {
                width / 2.0
            } else if anchor.is_right() {
                width
            } else {
                0.0
            };
        // Baseline placement; device y grows downward.
        let baseline = y as f32
            + if anchor.is_top() {
                size
            } else if anchor.is_center_y() {
                size / 2.0
            } else {
                0.0
            };

        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, size);
            let gx = pen_x + metrics.xmin as f32;
            let gy = baseline - metrics.height as f32 - metrics.ymin as f32;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    let dx = gx + col as f32;
                    let dy = gy + row as f32;
                    if let Some(c) = clip {
                        if !c.contains_point(GrPoint::new(dx as f64, dy as f64)) {
                            continue;
                        }
                    }
                    let px = dx + transform.tx;
                    let py = dy + transform.ty;
                    // Glyph coverage blending is inherently anti-aliased;
                    // the general toggle does not apply to text.
                    Self::blend_pixel(target, px as i32, py as i32, color, coverage);
                }
            }
            pen_x += metrics.advance_width;
        }
    }

    fn erase(&mut self) {
        let bg = ts_color(self.background);
        match &mut self.buffer {
            Some(b) => b.fill(bg),
            None => self.visible.fill(bg),
        }
    }

    fn limits(&self) -> Limits {
        Limits::new(
            0.0,
            0.0,
            self.visible.width() as f64,
            self.visible.height() as f64,
        )
    }

    fn is_printing(&self) -> bool {
        false
    }

    fn plot_end(&mut self, mode: CloseMode) -> Result<(), DeviceError> {
        // "Flush" for the interactive backend means making buffered
        // drawing visible; a hard end also releases the buffer.
        self.show_double_buffer();
        if mode == CloseMode::Hard {
            self.buffer = None;
            self.rebuild_clip_mask();
        }
        Ok(())
    }
}

impl Device<RasterSurface> {
    /// Create an interactive raster device of the given pixel size.
    pub fn create_raster(width: u32, height: u32) -> Result<Self, DeviceError> {
        Ok(Device::new(RasterSurface::new(width, height)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_replaces_the_buffer() {
        let mut s = RasterSurface::new(200, 200).unwrap();
        s.setup_double_buffer(0, 0, 100, 100).unwrap();
        assert_eq!(s.buffer_size(), Some((100, 100)));
        s.setup_double_buffer(0, 0, 50, 50).unwrap();
        // Exactly one live buffer, with the new dimensions.
        assert_eq!(s.buffer_size(), Some((50, 50)));
    }

    #[test]
    fn buffer_starts_fully_transparent() {
        let mut s = RasterSurface::new(10, 10).unwrap();
        s.setup_double_buffer(0, 0, 10, 10).unwrap();
        let buf = s.buffer.as_ref().unwrap();
        assert!(buf.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn save_without_buffer_fails() {
        let s = RasterSurface::new(10, 10).unwrap();
        let err = s.save_as_file("/tmp/never-written.png").unwrap_err();
        assert!(matches!(err, DeviceError::NoBuffer));
    }

    #[test]
    fn show_double_buffer_blits() {
        let mut s = RasterSurface::new(4, 4).unwrap();
        s.setup_double_buffer(0, 0, 4, 4).unwrap();
        s.set_color(GrColor::rgb(255, 0, 0));
        s.fill_rectangle(Limits::new(0.0, 0.0, 4.0, 4.0));
        // Visible surface still shows the white background.
        assert_eq!(s.pixels().data()[0], 255);
        assert_eq!(s.pixels().data()[2], 255);
        s.show_double_buffer();
        let d = s.pixels().data();
        assert_eq!((d[0], d[1], d[2]), (255, 0, 0));
    }

    #[test]
    fn drawing_without_buffer_hits_visible_surface() {
        let mut s = RasterSurface::new(8, 8).unwrap();
        s.set_color(GrColor::BLACK);
        s.fill_rectangle(Limits::new(0.0, 0.0, 8.0, 8.0));
        let d = s.pixels().data();
        assert_eq!((d[0], d[1], d[2]), (0, 0, 0));
    }

    #[test]
    fn save_dispatches_on_extension() {
        let mut s = RasterSurface::new(16, 16).unwrap();
        s.setup_double_buffer(0, 0, 16, 16).unwrap();
        s.set_color(GrColor::rgb(0, 0, 255));
        s.fill_rectangle(Limits::new(0.0, 0.0, 16.0, 16.0));

        let dir = std::env::temp_dir();
        let png = dir.join(format!("grist-save-{}.png", std::process::id()));
        s.save_as_file(&png).unwrap();
        let bytes = std::fs::read(&png).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
        std::fs::remove_file(&png).ok();

        let jpg = dir.join(format!("grist-save-{}.jpeg", std::process::id()));
        s.save_as_file(&jpg).unwrap();
        let bytes = std::fs::read(&jpg).unwrap();
        assert_eq!(&bytes[..2], b"\xff\xd8");
        std::fs::remove_file(&jpg).ok();
    }

    #[test]
    fn unrecognized_extension_coerces_to_jpg() {
        let mut s = RasterSurface::new(8, 8).unwrap();
        s.setup_double_buffer(0, 0, 8, 8).unwrap();
        let dir = std::env::temp_dir();
        let tif = dir.join(format!("grist-coerce-{}.tif", std::process::id()));
        s.save_as_file(&tif).unwrap();
        let jpg = tif.with_extension("jpg");
        assert!(jpg.exists());
        assert!(!tif.exists());
        std::fs::remove_file(&jpg).ok();
    }

    #[test]
    fn hard_plot_end_releases_the_buffer() {
        let mut s = RasterSurface::new(8, 8).unwrap();
        s.setup_double_buffer(0, 0, 8, 8).unwrap();
        s.plot_end(CloseMode::Soft).unwrap();
        assert!(s.has_buffer());
        s.plot_end(CloseMode::Hard).unwrap();
        assert!(!s.has_buffer());
        // The interactive backend never reports printing.
        assert!(!s.is_printing());
    }

    #[test]
    fn filled_arc_covers_the_pie_center() {
        let mut s = RasterSurface::new(20, 20).unwrap();
        s.set_color(GrColor::rgb(0, 255, 0));
        s.fill_arc(GrPoint::new(10.0, 10.0), 8.0, 8.0, 0.0, 360.0);
        let d = s.pixels().data();
        let center = ((10 * 20) + 10) * 4;
        assert_eq!((d[center], d[center + 1], d[center + 2]), (0, 255, 0));
        // Corners stay background.
        assert_eq!((d[0], d[1], d[2]), (255, 255, 255));
    }

    #[test]
    fn clipping_confines_fills() {
        let mut s = RasterSurface::new(8, 8).unwrap();
        s.set_clip(Some(Limits::new(0.0, 0.0, 4.0, 8.0)));
        s.set_color(GrColor::rgb(255, 0, 0));
        s.fill_rectangle(Limits::new(0.0, 0.0, 8.0, 8.0));
        let d = s.pixels().data();
        // Inside the clip: red. Outside (x=6): still white.
        let inside = 0;
        let outside = ((2 * 8) + 6) * 4;
        assert_eq!((d[inside], d[inside + 1], d[inside + 2]), (255, 0, 0));
        assert_eq!((d[outside], d[outside + 1], d[outside + 2]), (255, 255, 255));
    }
}
