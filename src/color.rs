//! RGB(+alpha) color with named-color parsing and serialization.
//!
//! `parse_color` never fails: any unparseable input degrades to opaque
//! black, because a wrongly-colored pixel is preferable to aborting a
//! render. Transparency is a side flag on the value, not encoded in the
//! RGB channels (an early attempt to encode "None" as `(0,0,-1)` did not
//! survive contact with packed 24-bit integers).

use std::fmt;

/// An RGB color with alpha and a transparency flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    transparent: bool,
}

/// Named-color table. Canonical spellings come before their aliases so
/// that reverse lookups produce the canonical name.
const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("Black", (0, 0, 0)),
    ("Blue", (0, 0, 255)),
    ("Cyan", (0, 255, 255)),
    ("DarkGray", (64, 64, 64)),
    ("DarkGrey", (64, 64, 64)),
    ("Gray", (128, 128, 128)),
    ("Grey", (128, 128, 128)),
    ("Green", (0, 255, 0)),
    ("LightGray", (192, 192, 192)),
    ("LightGrey", (192, 192, 192)),
    ("Magenta", (255, 0, 255)),
    ("Orange", (255, 200, 0)),
    ("Pink", (255, 175, 175)),
    ("Red", (255, 0, 0)),
    ("White", (255, 255, 255)),
    ("Yellow", (255, 255, 0)),
];

/// Packed value reserved for the transparent "None" color.
const NONE_PACKED: i32 = -1;

impl GrColor {
    pub const BLACK: GrColor = GrColor::rgb(0, 0, 0);
    pub const WHITE: GrColor = GrColor::rgb(255, 255, 255);

    /// Opaque color from 0-255 channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        GrColor { r, g, b, a: 255, transparent: false }
    }

    /// Color from 0-255 channels with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        GrColor { r, g, b, a, transparent: false }
    }

    /// Opaque color from floating channels in `[0, 1]` (clamped).
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        GrColor::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Opaque color from a packed 24-bit `0xRRGGBB` integer.
    pub fn from_packed(value: i32) -> Self {
        if value == NONE_PACKED {
            return GrColor::none();
        }
        GrColor::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// The transparent "None" color: black channels, transparent flag set.
    pub const fn none() -> Self {
        GrColor { r: 0, g: 0, b: 0, a: 0, transparent: true }
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Packed 24-bit RGB value; the transparent color packs to -1.
    pub fn packed(&self) -> i32 {
        if self.transparent {
            NONE_PACKED
        } else {
            ((self.r as i32) << 16) | ((self.g as i32) << 8) | (self.b as i32)
        }
    }

    /// Channels as unit floats, for backends that take 0-1 color.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

impl fmt::Display for GrColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(self.packed()))
    }
}

/// Resolve a color string.
///
/// Resolution order: (1) case-insensitive named-color table ("None" gives
/// the transparent color); (2) text containing a decimal point: three
/// comma-separated floats in `[0, 1]`; (3) text containing a comma: three
/// comma-separated integers in `[0, 255]`; (4) a hexadecimal RGB literal,
/// with or without a `0x`/`#` prefix; (5) fallback to opaque black.
pub fn parse_color(text: &str) -> GrColor {
    let text = text.trim();
    if text.eq_ignore_ascii_case("none") {
        return GrColor::none();
    }
    for (name, (r, g, b)) in NAMED {
        if name.eq_ignore_ascii_case(text) {
            return GrColor::rgb(*r, *g, *b);
        }
    }
    if text.contains('.') {
        if let Some([r, g, b]) = parse_triplet::<f64>(text) {
            return GrColor::from_unit(r, g, b);
        }
    } else if text.contains(',') {
        if let Some([r, g, b]) = parse_triplet::<i64>(text) {
            if (0..=255).contains(&r) && (0..=255).contains(&g) && (0..=255).contains(&b) {
                return GrColor::rgb(r as u8, g as u8, b as u8);
            }
        }
    } else {
        let hex = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .or_else(|| text.strip_prefix('#'))
            .unwrap_or(text);
        if !hex.is_empty() {
            if let Ok(value) = i32::from_str_radix(hex, 16) {
                return GrColor::from_packed(value & 0xff_ff_ff);
            }
        }
    }
    crate::log::debug!(text, "unparseable color, using black");
    GrColor::BLACK
}

/// Named color to packed RGB integer; unmatched names resolve to black
/// and "None" to the reserved transparent value.
pub fn to_integer(name: &str) -> i32 {
    parse_color(name).packed()
}

/// Packed RGB integer back to its name, if it has one. Unmatched values
/// serialize as their decimal string.
pub fn to_string(value: i32) -> String {
    if value == NONE_PACKED {
        return "None".to_string();
    }
    let rgb = (
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    );
    for (name, named) in NAMED {
        if *named == rgb {
            return (*name).to_string();
        }
    }
    value.to_string()
}

fn parse_triplet<T: std::str::FromStr>(text: &str) -> Option<[T; 3]> {
    let mut parts = text.split(',').map(|p| p.trim().parse::<T>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([r, g, b])
}
